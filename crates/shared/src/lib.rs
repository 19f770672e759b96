pub mod domain;
pub mod error;
pub mod markers;
pub mod settings;
