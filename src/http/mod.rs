//! HTTP server startup and shutdown handling.

pub mod server;
pub mod shutdown;

pub use server::{start_server, ServerError};
