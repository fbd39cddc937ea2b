//! Coordination service client.
//!
//! The cluster coordinator is an opaque external collaborator: this service
//! only needs a live TCP session to it before serving traffic. The session is
//! opened once during bootstrap and held for the life of the process; it is
//! never explicitly closed, cleanup happens at process exit.
//!
//! Two readiness gates are supported:
//! - Flat delay (default): sleep `startup_delay_seconds`, then connect once.
//! - Bounded-retry probe: poll the coordinator port until it accepts a
//!   connection or the attempt budget is exhausted.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::CoordinatorConfig;

/// Coordinator connection error
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("Coordinator at {addr} unreachable: {source}")]
    Unreachable {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Coordinator handshake to {addr} timed out after {seconds}s")]
    Timeout { addr: String, seconds: u64 },

    #[error("Coordinator at {addr} not ready after {attempts} probe attempts")]
    NotReady { addr: String, attempts: u32 },
}

/// A live session with the coordination service.
///
/// Holds the underlying TCP stream purely to keep the session open; no
/// request handler ever touches it.
#[derive(Debug)]
pub struct CoordinatorClient {
    addr: String,
    _stream: TcpStream,
}

impl CoordinatorClient {
    /// Wait for the coordinator to become ready.
    ///
    /// This always completes before any connect attempt is made. The flat
    /// delay reproduces the stock startup behavior; the probe variant
    /// replaces the blind wait with an actual readiness check.
    pub async fn wait_until_ready(config: &CoordinatorConfig) -> Result<(), CoordinatorError> {
        if config.probe {
            probe_until_ready(config).await
        } else {
            tracing::debug!(
                seconds = config.startup_delay_seconds,
                "Waiting for coordinator to be ready"
            );
            tokio::time::sleep(Duration::from_secs(config.startup_delay_seconds)).await;
            Ok(())
        }
    }

    /// Open the coordinator session.
    ///
    /// A successful TCP connect within the configured timeout counts as a
    /// successful handshake; any failure is fatal to bootstrap.
    pub async fn connect(config: &CoordinatorConfig) -> Result<Self, CoordinatorError> {
        let addr = config.addr();
        tracing::debug!(addr = %addr, "Connecting to coordinator");

        let connect = TcpStream::connect(&addr);
        let stream = match timeout(Duration::from_secs(config.connect_timeout_seconds), connect)
            .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(CoordinatorError::Unreachable { addr, source });
            }
            Err(_) => {
                return Err(CoordinatorError::Timeout {
                    addr,
                    seconds: config.connect_timeout_seconds,
                });
            }
        };

        tracing::debug!(addr = %addr, "Coordinator session established");
        Ok(Self {
            addr,
            _stream: stream,
        })
    }

    /// Address of the coordinator this session is bound to.
    pub fn addr(&self) -> &str {
        &self.addr
    }
}

/// Poll the coordinator port until it accepts a connection.
async fn probe_until_ready(config: &CoordinatorConfig) -> Result<(), CoordinatorError> {
    let addr = config.addr();
    let interval = Duration::from_secs(config.probe_interval_seconds);

    for attempt in 1..=config.probe_attempts {
        match TcpStream::connect(&addr).await {
            Ok(_) => {
                tracing::debug!(addr = %addr, attempt, "Coordinator ready");
                return Ok(());
            }
            Err(error) => {
                tracing::debug!(addr = %addr, attempt, %error, "Coordinator not ready yet");
            }
        }
        if attempt < config.probe_attempts {
            tokio::time::sleep(interval).await;
        }
    }

    Err(CoordinatorError::NotReady {
        addr,
        attempts: config.probe_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn test_config(port: u16) -> CoordinatorConfig {
        CoordinatorConfig {
            host: "127.0.0.1".to_string(),
            port,
            startup_delay_seconds: 0,
            connect_timeout_seconds: 2,
            probe: false,
            probe_attempts: 3,
            probe_interval_seconds: 0,
        }
    }

    #[tokio::test]
    async fn connect_succeeds_against_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let client = CoordinatorClient::connect(&test_config(port)).await.unwrap();
        assert_eq!(client.addr(), format!("127.0.0.1:{}", port));
    }

    #[tokio::test]
    async fn connect_fails_when_nothing_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = CoordinatorClient::connect(&test_config(port)).await.unwrap_err();
        assert!(matches!(err, CoordinatorError::Unreachable { .. }));
    }

    #[tokio::test]
    async fn probe_gate_fails_after_attempt_budget() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut config = test_config(port);
        config.probe = true;

        let err = CoordinatorClient::wait_until_ready(&config).await.unwrap_err();
        assert!(matches!(err, CoordinatorError::NotReady { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn probe_gate_passes_when_listener_is_up() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut config = test_config(port);
        config.probe = true;

        CoordinatorClient::wait_until_ready(&config).await.unwrap();
    }

    #[tokio::test]
    async fn flat_gate_completes_without_coordinator() {
        // The blind delay never inspects the network.
        let config = test_config(1);
        CoordinatorClient::wait_until_ready(&config).await.unwrap();
    }
}
