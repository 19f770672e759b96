//! Controller layer: UI events, the simulated page, and command orchestration.

pub mod events;
pub mod orchestration;
pub mod page;
