//! Casaora agent chat bridge.
//!
//! Accepts one chat turn from the admin console, forwards it to the agent
//! backend and re-encodes the backend's event stream as a UI message stream
//! that the chat renderer consumes incrementally.

pub mod auth;
pub mod bridge;
pub mod error;
pub mod request;
pub mod routes;
pub mod upstream;

pub use error::ApiError;
pub use routes::{AppState, build_router};
