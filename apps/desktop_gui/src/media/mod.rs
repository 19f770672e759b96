//! Animation assets played inside the loading overlay.

pub mod lottie;
