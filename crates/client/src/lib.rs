mod http;
pub mod rpc;
pub mod wallet;

pub use http::HttpTransport;
pub use wallet::{RemoteWallet, WalletProvider, WalletSession};

use serde_json::Value;
use std::{future::Future, time::Duration};
use thiserror::Error;

/// JSON-RPC error code nodes use for a reverted execution.
pub const EXECUTION_REVERTED: i64 = 3;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error connecting to the RPC endpoint
    #[error("Connection error: {0}")]
    Connection(String),

    /// Endpoint answered with a non-success HTTP status
    #[error("RPC endpoint returned {status}: {body}")]
    Http { status: u16, body: String },

    /// Endpoint answered with a JSON-RPC error object
    #[error("JSON-RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<String>,
    },

    /// Response did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Wallet refused or could not serve the request
    #[error("Wallet error: {0}")]
    Wallet(String),
}

impl ClientError {
    /// Whether this is a node-reported execution revert.
    pub fn is_revert(&self) -> bool {
        match self {
            Self::Rpc { code, message, .. } => {
                *code == EXECUTION_REVERTED || message.to_lowercase().contains("revert")
            }
            _ => false,
        }
    }

    /// Hex revert payload attached to an RPC error, if any.
    pub fn revert_data(&self) -> Option<&str> {
        match self {
            Self::Rpc { data, .. } => data.as_deref(),
            _ => None,
        }
    }
}

/// A JSON-RPC request/response channel.
///
/// The HTTP implementation is [`HttpTransport`]; tests substitute scripted
/// transports.
pub trait Transport: Send + Sync {
    /// Send `method` with `params` and return the `result` member.
    fn request(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = Result<Value, ClientError>> + Send;
}

impl<T: Transport> Transport for &T {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        (**self).request(method, params).await
    }
}

/// Convenience function to create a JSON-RPC transport from url.
pub fn create_transport(rpc_url: &str, timeout: Duration) -> Result<HttpTransport, ClientError> {
    HttpTransport::new(rpc_url, timeout)
}
