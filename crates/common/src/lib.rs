//! HoverIntent Common Utilities
//!
//! Shared infrastructure for all HoverIntent crates:
//! - Error types and result aliases
//! - Monotonic clock used to drive timer deadlines
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
