//! Typed wrappers for the handful of RPC methods the token client uses.

use crate::{ClientError, Transport};
use serde::Serialize;
use serde_json::{json, Value};

pub const ETH_CALL: &str = "eth_call";
pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const GET_PUBLIC_KEYS_INFO: &str = "btc_getPublicKeysInfo";

/// Call object for `eth_call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRequest {
    /// Contract address
    pub to: String,
    /// Hex calldata, `0x`-prefixed
    pub data: String,
    /// Caller, set when simulating a write
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

/// Execute a read-only call against the latest state and return the raw hex result.
pub async fn eth_call<T: Transport>(transport: &T, call: &CallRequest) -> Result<String, ClientError> {
    let result = transport
        .request(ETH_CALL, json!([call, "latest"]))
        .await?;

    match result {
        Value::String(hex) => Ok(hex),
        Value::Null => Ok(String::new()),
        other => Err(ClientError::InvalidResponse(format!(
            "eth_call returned {other}"
        ))),
    }
}

/// Chain id the node is serving.
pub async fn chain_id<T: Transport>(transport: &T) -> Result<u64, ClientError> {
    let result = transport.request(ETH_CHAIN_ID, json!([])).await?;
    parse_quantity(&result)
}

/// Look up the public key registered for `address`.
///
/// Returns `None` when the node knows nothing about the address.
pub async fn public_key_info<T: Transport>(
    transport: &T,
    address: &str,
) -> Result<Option<String>, ClientError> {
    let result = transport
        .request(GET_PUBLIC_KEYS_INFO, json!([[address]]))
        .await?;

    let Some(entry) = result.get(address) else {
        return Ok(None);
    };

    if let Some(error) = entry.get("error").and_then(Value::as_str) {
        return Err(ClientError::InvalidResponse(format!(
            "public key lookup for {address} failed: {error}"
        )));
    }

    Ok(entry
        .get("tweakedPubkey")
        .and_then(Value::as_str)
        .map(str::to_string))
}

/// Parse a JSON-RPC quantity: a `0x` hex string, a decimal string or a number.
pub fn parse_quantity(value: &Value) -> Result<u64, ClientError> {
    let invalid = || ClientError::InvalidResponse(format!("not a quantity: {value}"));

    match value {
        Value::Number(n) => n.as_u64().ok_or_else(invalid),
        Value::String(s) => match s.strip_prefix("0x") {
            Some(hex_digits) => u64::from_str_radix(hex_digits, 16).map_err(|_| invalid()),
            None => s.parse().map_err(|_| invalid()),
        },
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Answers every request with one canned value and records the call.
    struct Canned {
        answer: Value,
        seen: Mutex<Vec<(String, Value)>>,
    }

    impl Canned {
        fn new(answer: Value) -> Self {
            Self {
                answer,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
            self.seen
                .lock()
                .unwrap()
                .push((method.to_string(), params));
            Ok(self.answer.clone())
        }
    }

    #[tokio::test]
    async fn test_eth_call_params() {
        let transport = Canned::new(json!("0x01"));
        let call = CallRequest {
            to: "0xabc".to_string(),
            data: "0x313ce567".to_string(),
            from: None,
        };

        assert_eq!(eth_call(&transport, &call).await.unwrap(), "0x01");

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].0, ETH_CALL);
        assert_eq!(
            seen[0].1,
            json!([{ "to": "0xabc", "data": "0x313ce567" }, "latest"])
        );
    }

    #[tokio::test]
    async fn test_eth_call_with_sender() {
        let transport = Canned::new(Value::Null);
        let call = CallRequest {
            to: "0xabc".to_string(),
            data: "0x".to_string(),
            from: Some("0xdef".to_string()),
        };

        assert_eq!(eth_call(&transport, &call).await.unwrap(), "");
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].1[0]["from"], json!("0xdef"));
    }

    #[tokio::test]
    async fn test_chain_id() {
        let transport = Canned::new(json!("0x539"));
        assert_eq!(chain_id(&transport).await.unwrap(), 1337);
    }

    #[tokio::test]
    async fn test_public_key_info() {
        let transport = Canned::new(json!({
            "bcrt1pexample": { "tweakedPubkey": "0xaa" }
        }));
        assert_eq!(
            public_key_info(&transport, "bcrt1pexample").await.unwrap(),
            Some("0xaa".to_string())
        );
        assert_eq!(public_key_info(&transport, "bcrt1punknown").await.unwrap(), None);

        let transport = Canned::new(json!({ "bcrt1pbad": { "error": "not found" } }));
        assert!(public_key_info(&transport, "bcrt1pbad").await.is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(&json!("0x1")).unwrap(), 1);
        assert_eq!(parse_quantity(&json!("42")).unwrap(), 42);
        assert_eq!(parse_quantity(&json!(7)).unwrap(), 7);
        assert!(parse_quantity(&json!("0xzz")).is_err());
        assert!(parse_quantity(&json!(null)).is_err());
    }
}
