//! UI layer for the loader demo: app shell and the loading overlay.

pub mod app;
pub mod overlay;

pub use app::LoaderDemoApp;
