//! External service clients.

pub mod detector;

pub use detector::HttpDetector;
