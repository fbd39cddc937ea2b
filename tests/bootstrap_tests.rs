//! End-to-end bootstrap tests.
//!
//! These tests start the compiled binary with a temporary config pointing at
//! a fake coordinator (a plain TCP listener) and exercise the externally
//! observable bootstrap behavior: gate ordering, fatal failures, and the
//! served greeting.
//!
//! Run with: cargo test --test bootstrap_tests

use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;

const GREETING: &str = "Hello from Ray microservice!";

/// Manages a spawned greetgate process, killing it on drop.
struct ServerGuard {
    child: Child,
    _config: NamedTempFile,
    http_port: u16,
}

impl ServerGuard {
    /// Spawn the binary with a config pointing at the given coordinator port.
    fn spawn(http_port: u16, coordinator_port: u16, startup_delay: u64) -> Self {
        let mut config = NamedTempFile::new().expect("Failed to create temp config");
        writeln!(
            config,
            r#"
[http]
host = "127.0.0.1"
port = {http_port}

[coordinator]
host = "127.0.0.1"
port = {coordinator_port}
startup_delay_seconds = {startup_delay}
connect_timeout_seconds = 2
"#
        )
        .expect("Failed to write temp config");

        let child = Command::new(env!("CARGO_BIN_EXE_greetgate"))
            .arg("--config")
            .arg(config.path())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to start greetgate");

        Self {
            child,
            _config: config,
            http_port,
        }
    }

    fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.http_port)
    }

    /// Wait for the HTTP listener to accept connections.
    fn wait_for_ready(&self) {
        let max_attempts = 100;
        let delay = Duration::from_millis(100);

        for _ in 0..max_attempts {
            if TcpStream::connect(format!("127.0.0.1:{}", self.http_port)).is_ok() {
                return;
            }
            std::thread::sleep(delay);
        }

        panic!(
            "server did not start within {} seconds",
            max_attempts as f64 * delay.as_secs_f64()
        );
    }

    /// Wait for the process to exit on its own, returning its exit status.
    fn wait_for_exit(&mut self) -> std::process::ExitStatus {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(status) = self.child.try_wait().expect("Failed to poll child") {
                return status;
            }
            assert!(Instant::now() < deadline, "process did not exit in time");
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Bind an ephemeral port and return (listener, port).
fn fake_coordinator() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind fake coordinator");
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// Reserve an ephemeral port, then release it for the server to use.
fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[tokio::test]
async fn serves_greeting_and_404s_everything_else() {
    let (_coordinator, coordinator_port) = fake_coordinator();
    let server = ServerGuard::spawn(free_port(), coordinator_port, 0);
    server.wait_for_ready();

    let response = reqwest::get(format!("{}/", server.base_url())).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), GREETING);

    let response = reqwest::get(format!("{}/other", server.base_url())).await.unwrap();
    assert_eq!(response.status(), 404);
}

#[test]
fn gate_completes_before_any_connect_attempt() {
    let (coordinator, coordinator_port) = fake_coordinator();
    let started = Instant::now();
    let _server = ServerGuard::spawn(free_port(), coordinator_port, 2);

    // The first connection to the coordinator must come after the full gate.
    let (_stream, _addr) = coordinator.accept().expect("coordinator accept failed");
    assert!(
        started.elapsed() >= Duration::from_secs(2),
        "connect attempt arrived before the startup gate elapsed"
    );
}

#[test]
fn unreachable_coordinator_is_fatal() {
    let (listener, coordinator_port) = fake_coordinator();
    drop(listener);

    let http_port = free_port();
    let mut server = ServerGuard::spawn(http_port, coordinator_port, 0);
    let status = server.wait_for_exit();
    assert!(!status.success());

    // No route was ever registered.
    assert!(TcpStream::connect(format!("127.0.0.1:{}", http_port)).is_err());
}

#[test]
fn occupied_http_port_is_fatal() {
    let (_coordinator, coordinator_port) = fake_coordinator();
    let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
    let http_port = occupied.local_addr().unwrap().port();

    let mut server = ServerGuard::spawn(http_port, coordinator_port, 0);
    let status = server.wait_for_exit();
    assert!(!status.success());
}

#[tokio::test]
async fn restart_reproduces_the_same_bootstrap() {
    let (_coordinator, coordinator_port) = fake_coordinator();

    for _ in 0..2 {
        let http_port = free_port();
        let server = ServerGuard::spawn(http_port, coordinator_port, 0);
        server.wait_for_ready();

        let response = reqwest::get(format!("{}/", server.base_url())).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), GREETING);
        // ServerGuard::drop kills the process; the next iteration starts clean.
    }
}
