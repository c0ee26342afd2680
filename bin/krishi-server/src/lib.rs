//! krishi-server: HTTP proxy between the chat front end and the generative
//! provider.
//!
//! The binary in `main.rs` wires these modules together; they are exposed as
//! a library so integration tests can build the router in-process.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{Config, RuntimeMode};
pub use error::ServerError;
pub use state::AppState;
