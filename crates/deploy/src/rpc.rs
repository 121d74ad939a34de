//! Shared utilities for talking to Ethereum JSON-RPC endpoints.

use std::{future::Future, time::Duration};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::LaunchpadError;

/// Default timeout for a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default interval between polling attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Create an HTTP client configured for JSON-RPC requests.
///
/// The request timeout bounds one round trip, wallet prompts included.
pub fn create_client(request_timeout: Duration) -> Result<reqwest::Client, LaunchpadError> {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .build()
        .map_err(|e| LaunchpadError::Network(format!("failed to create HTTP client: {}", e)))
}

/// Make a JSON-RPC call and deserialize the result.
///
/// Transport failures map to [`LaunchpadError::Network`], error objects to
/// [`LaunchpadError::from_rpc`].
pub async fn json_rpc_call<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Vec<Value>,
) -> Result<T, LaunchpadError> {
    let response = client
        .post(url)
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        }))
        .send()
        .await
        .map_err(|e| LaunchpadError::Network(format!("failed to send {}: {}", method, e)))?;

    let result: Value = response
        .json()
        .await
        .map_err(|e| LaunchpadError::Network(format!("failed to parse {} response: {}", method, e)))?;

    if let Some(error) = result.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        return Err(LaunchpadError::from_rpc(code, message, None));
    }

    let result_value = result
        .get("result")
        .cloned()
        .ok_or_else(|| LaunchpadError::Network(format!("no result in {} response", method)))?;

    serde_json::from_value(result_value).map_err(|e| {
        LaunchpadError::Network(format!("failed to deserialize {} result: {}", method, e))
    })
}

/// Poll `check_fn` until it yields a value.
///
/// `timeout` of `None` waits forever. Errors from `check_fn` abort the wait.
pub async fn poll_until<T, F, Fut>(
    interval: Duration,
    timeout: Option<Duration>,
    check_fn: F,
) -> Result<Option<T>, LaunchpadError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<T>, LaunchpadError>>,
{
    let start = tokio::time::Instant::now();

    loop {
        if let Some(value) = check_fn().await? {
            return Ok(Some(value));
        }

        if timeout.is_some_and(|max| start.elapsed() >= max) {
            return Ok(None);
        }

        tracing::trace!(elapsed = ?start.elapsed(), "Still waiting, polling again...");
        tokio::time::sleep(interval).await;
    }
}

/// Parse a `0x`-prefixed quantity as returned by JSON-RPC.
pub fn parse_quantity(value: &str) -> Result<u64, LaunchpadError> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16)
        .map_err(|e| LaunchpadError::Network(format!("malformed quantity '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0xaa36a7").unwrap(), 11155111);
        assert_eq!(parse_quantity("0x1").unwrap(), 1);
        assert!(parse_quantity("0xzz").is_err());
    }

    #[tokio::test]
    async fn test_poll_until_returns_first_value() {
        let calls = AtomicU32::new(0);
        let value = poll_until(Duration::from_millis(1), None, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok((n == 2).then_some(n)) }
        })
        .await
        .unwrap();

        assert_eq!(value, Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_poll_until_times_out() {
        let value: Option<()> = poll_until(
            Duration::from_millis(5),
            Some(Duration::from_millis(20)),
            || async { Ok(None) },
        )
        .await
        .unwrap();

        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_poll_until_propagates_errors() {
        let result: Result<Option<()>, _> = poll_until(Duration::from_millis(1), None, || async {
            Err(LaunchpadError::Network("down".to_string()))
        })
        .await;

        assert!(matches!(result, Err(LaunchpadError::Network(_))));
    }

    #[tokio::test]
    async fn test_json_rpc_call_unreachable_is_network_error() {
        let client = create_client(Duration::from_secs(2)).unwrap();
        let result: Result<String, _> =
            json_rpc_call(&client, "http://127.0.0.1:1/", "eth_chainId", vec![]).await;

        assert!(matches!(result, Err(LaunchpadError::Network(_))));
    }
}
