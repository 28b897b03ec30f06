//! Casaora Core Library
//!
//! Shared functionality for the agent chat bridge:
//! - Tolerant parsing of the agent backend's event stream
//! - The UI message stream frame vocabulary and its wire encoding
//! - Configuration resolution and hierarchy
//! - Common error types

pub mod config;
pub mod error;
pub mod tracing_init;
pub mod ui_stream;
pub mod upstream;

pub use config::Config;
pub use error::{Error, Result};
