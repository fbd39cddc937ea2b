//! Top-level bootstrap error.
//!
//! Every failure during startup lands here: config problems, coordinator
//! connection failures, listener bind conflicts, serve errors. The policy is
//! log-once-then-die; none of these are retried and the process exits
//! non-zero so an external supervisor can restart it.

use crate::config::ConfigError;
use crate::coordinator::CoordinatorError;
use crate::http::ServerError;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    #[error(transparent)]
    Server(#[from] ServerError),
}
