//! Wallet provider surface.
//!
//! The wallet itself is external. [`WalletProvider`] is the slice of it the
//! token client needs, and [`RemoteWallet`] reaches a wallet bridge that
//! speaks JSON-RPC over HTTP (typically a browser extension relay or a
//! signing service holding the keys).

use crate::{
    rpc::{parse_quantity, ETH_CHAIN_ID},
    ClientError, HttpTransport, Transport,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{future::Future, time::Duration};
use tracing::{debug, info};

pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
pub const DISCONNECT: &str = "wallet_disconnect";

/// Accounts granted by a successful connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    pub accounts: Vec<String>,
    pub chain_id: Option<u64>,
}

impl WalletSession {
    /// The active account, i.e. the first one the wallet granted.
    pub fn account(&self) -> Option<&str> {
        self.accounts.first().map(String::as_str)
    }
}

/// Fee policy for a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeRate {
    /// Let the wallet pick the current rate
    Auto,
}

/// Parameters of `eth_sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransaction {
    pub from: String,
    pub to: String,
    pub data: String,
    pub value: String,
    pub fee_rate: FeeRate,
    /// Upper bound on what the wallet may spend to get the transaction mined
    pub maximum_allowed_spend: u64,
}

impl SendTransaction {
    /// Contract call with no value attached and automatic fees.
    pub fn contract_call(from: &str, to: &str, data: String, maximum_allowed_spend: u64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            data,
            value: "0x0".to_string(),
            fee_rate: FeeRate::Auto,
            maximum_allowed_spend,
        }
    }
}

/// The wallet operations the token client depends on.
pub trait WalletProvider: Send + Sync {
    /// Ask the user to grant account access.
    fn connect(&self) -> impl Future<Output = Result<WalletSession, ClientError>> + Send;

    /// Drop the wallet session.
    fn disconnect(&self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Forward an arbitrary wallet request.
    fn request(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = Result<Value, ClientError>> + Send;
}

/// Ask the wallet to sign and broadcast `tx`; returns the transaction id.
pub async fn send_transaction<W: WalletProvider>(
    wallet: &W,
    tx: &SendTransaction,
) -> Result<String, ClientError> {
    let result = wallet.request(SEND_TRANSACTION, json!([tx])).await?;

    match result {
        Value::String(hash) if !hash.is_empty() => {
            info!(tx_hash = %hash, to = %tx.to, "Transaction broadcast.");
            Ok(hash)
        }
        other => Err(ClientError::InvalidResponse(format!(
            "wallet returned no transaction id: {other}"
        ))),
    }
}

/// A wallet reached through a JSON-RPC bridge.
///
/// # Example
///
/// ```ignore
/// let wallet = RemoteWallet::new("http://localhost:9060", Duration::from_secs(30))?;
/// let session = wallet.connect().await?;
/// ```
#[derive(Debug)]
pub struct RemoteWallet<T = HttpTransport> {
    transport: T,
}

impl RemoteWallet<HttpTransport> {
    /// Creates a wallet client for the bridge at `url`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self::with_transport(HttpTransport::new(url, timeout)?))
    }
}

impl<T: Transport> RemoteWallet<T> {
    /// Creates a wallet client over a custom transport.
    pub const fn with_transport(transport: T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> WalletProvider for RemoteWallet<T> {
    async fn connect(&self) -> Result<WalletSession, ClientError> {
        let accounts = self.transport.request(REQUEST_ACCOUNTS, json!([])).await?;
        let accounts: Vec<String> = serde_json::from_value(accounts)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if accounts.is_empty() {
            return Err(ClientError::Wallet("No accounts found".to_string()));
        }

        let chain_id = match self.transport.request(ETH_CHAIN_ID, json!([])).await {
            Ok(value) => Some(parse_quantity(&value)?),
            Err(ClientError::Rpc { message, .. }) => {
                debug!(%message, "Wallet did not report a chain id");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(WalletSession { accounts, chain_id })
    }

    async fn disconnect(&self) -> Result<(), ClientError> {
        self.transport.request(DISCONNECT, json!([])).await?;
        Ok(())
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        self.transport.request(method, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashMap, sync::Mutex};

    struct Bridge {
        answers: HashMap<&'static str, Result<Value, i64>>,
        seen: Mutex<Vec<(String, Value)>>,
    }

    impl Bridge {
        fn new(answers: Vec<(&'static str, Result<Value, i64>)>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for Bridge {
        async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
            self.seen
                .lock()
                .unwrap()
                .push((method.to_string(), params));
            match self.answers.get(method) {
                Some(Ok(value)) => Ok(value.clone()),
                Some(Err(code)) => Err(ClientError::Rpc {
                    code: *code,
                    message: format!("{method} failed"),
                    data: None,
                }),
                None => Err(ClientError::Connection("no route".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_connect_returns_first_account() {
        let wallet = RemoteWallet::with_transport(Bridge::new(vec![
            (REQUEST_ACCOUNTS, Ok(json!(["0xaaa", "0xbbb"]))),
            (ETH_CHAIN_ID, Ok(json!("0x539"))),
        ]));

        let session = wallet.connect().await.unwrap();
        assert_eq!(session.account(), Some("0xaaa"));
        assert_eq!(session.chain_id, Some(1337));
    }

    #[tokio::test]
    async fn test_connect_without_accounts_fails() {
        let wallet =
            RemoteWallet::with_transport(Bridge::new(vec![(REQUEST_ACCOUNTS, Ok(json!([])))]));

        assert!(matches!(
            wallet.connect().await,
            Err(ClientError::Wallet(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_tolerates_missing_chain_id() {
        let wallet = RemoteWallet::with_transport(Bridge::new(vec![
            (REQUEST_ACCOUNTS, Ok(json!(["0xaaa"]))),
            (ETH_CHAIN_ID, Err(-32601)),
        ]));

        let session = wallet.connect().await.unwrap();
        assert_eq!(session.chain_id, None);
    }

    #[tokio::test]
    async fn test_send_transaction_shape() {
        let wallet = RemoteWallet::with_transport(Bridge::new(vec![(
            SEND_TRANSACTION,
            Ok(json!("0xfeed")),
        )]));
        let tx = SendTransaction::contract_call("0xaaa", "0xtoken", "0xa9059cbb".to_string(), 10_000);

        let hash = send_transaction(&wallet, &tx).await.unwrap();
        assert_eq!(hash, "0xfeed");

        let seen = wallet.transport.seen.lock().unwrap();
        assert_eq!(
            seen[0].1,
            json!([{
                "from": "0xaaa",
                "to": "0xtoken",
                "data": "0xa9059cbb",
                "value": "0x0",
                "feeRate": "auto",
                "maximumAllowedSpend": 10000
            }])
        );
    }

    #[tokio::test]
    async fn test_send_transaction_requires_hash() {
        let wallet =
            RemoteWallet::with_transport(Bridge::new(vec![(SEND_TRANSACTION, Ok(json!("")))]));
        let tx = SendTransaction::contract_call("0xaaa", "0xtoken", "0x".to_string(), 1);

        assert!(send_transaction(&wallet, &tx).await.is_err());
    }
}
