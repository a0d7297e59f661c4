//! Common utilities shared by the library and the CLI

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Split an ARN-like string on ':' and count the segments.
pub fn colon_segments(s: &str) -> usize {
    s.split(':').count()
}
