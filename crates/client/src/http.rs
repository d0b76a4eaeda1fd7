//! HTTP JSON-RPC transport.
//!
//! Every request is a single `POST` of `{jsonrpc, method, params, id}`; the
//! response's `result` is returned as-is and an `error` member becomes
//! [`ClientError::Rpc`].

use crate::{ClientError, Transport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tracing::debug;

/// JSON-RPC transport over HTTP.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: reqwest::Url,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Creates a transport for `rpc_url` with a per-request timeout.
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let url = reqwest::Url::parse(rpc_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Ok(Self::with_client(client, url))
    }

    /// Creates a transport with a custom HTTP client.
    pub const fn with_client(client: reqwest::Client, url: reqwest::Url) -> Self {
        Self {
            client,
            url,
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the endpoint url.
    pub const fn url(&self) -> &reqwest::Url {
        &self.url
    }
}

impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        debug!(method, id, url = %self.url, "Sending JSON-RPC request");

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let rpc_response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        rpc_response.into_result()
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    data: Option<Value>,
}

impl JsonRpcResponse {
    fn into_result(self) -> Result<Value, ClientError> {
        match self.error {
            Some(error) => Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
                data: error.data.map(|data| match data {
                    Value::String(s) => s,
                    other => other.to_string(),
                }),
            }),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "eth_call",
            params: json!([{ "to": "0x01", "data": "0x02" }, "latest"]),
            id: 7,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "method": "eth_call",
                "params": [{ "to": "0x01", "data": "0x02" }, "latest"],
                "id": 7
            })
        );
    }

    #[test]
    fn test_response_result() {
        let response: JsonRpcResponse =
            serde_json::from_value(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x2a" }))
                .unwrap();
        assert_eq!(response.into_result().unwrap(), json!("0x2a"));
    }

    #[test]
    fn test_response_error_keeps_revert_data() {
        let response: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": 3, "message": "execution reverted", "data": "0xdeadbeef" }
        }))
        .unwrap();

        match response.into_result() {
            Err(ClientError::Rpc {
                code,
                message,
                data,
            }) => {
                assert_eq!(code, 3);
                assert_eq!(message, "execution reverted");
                assert_eq!(data.as_deref(), Some("0xdeadbeef"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_null_result() {
        let response: JsonRpcResponse =
            serde_json::from_value(json!({ "jsonrpc": "2.0", "id": 1, "result": null })).unwrap();
        assert_eq!(response.into_result().unwrap(), Value::Null);
    }
}
