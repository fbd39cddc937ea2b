//! The greeting endpoint.
//!
//! The single application route: `GET /` returns a fixed greeting with
//! 200 OK. The handler takes no meaningful input.

use crate::config::GREETING_BODY;

/// Greeting handler.
pub async fn greet() -> &'static str {
    tracing::debug!("Handling request to root endpoint");
    GREETING_BODY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn greeting_body_is_exact() {
        assert_eq!(greet().await, "Hello from Ray microservice!");
    }
}
