//! Pooled HTTP client for the inference backend

use crate::core::config::RelayConfig;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// Builds the client shared by every request.
///
/// No total request timeout is set, since a generation may legitimately run for minutes. Stalls
/// are bounded per read with [`within`] instead.
pub fn build_http_client(config: &RelayConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .tcp_nodelay(true)
        .build()
}

/// Awaits `future`, giving up after `limit` if one is set. The error carries the limit.
pub async fn within<F: Future>(limit: Option<Duration>, future: F) -> Result<F::Output, Duration> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| limit),
        None => Ok(future.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&RelayConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_within_without_limit() {
        assert_eq!(within(None, async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_within_elapsed() {
        let limit = Duration::from_millis(10);
        let result = within(Some(limit), std::future::pending::<()>()).await;
        assert_eq!(result, Err(limit));
    }
}
