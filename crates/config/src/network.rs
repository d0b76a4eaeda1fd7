//! Typed configuration sections.
//!
//! Each section is produced by [`crate::AppConfig`] after every required key
//! has been found, so the values here are always complete.

use std::time::Duration;

/// Default RPC request timeout when `REQUEST_TIMEOUT_SECS` is not set.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on what a single write may spend when `MAX_SPEND` is not set.
pub const DEFAULT_MAX_SPEND: u64 = 10_000;

/// Native currency of the chain the token lives on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCurrency {
    /// Display name, e.g. "Bitcoin"
    pub name: String,
    /// Ticker, e.g. "BTC"
    pub symbol: String,
    /// Number of decimals of the native unit
    pub decimals: u8,
}

/// RPC endpoint and chain identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint url
    pub rpc_url: String,
    /// Chain ID as reported by `eth_chainId`
    pub chain_id: u64,
    /// Human-readable chain name
    pub chain_name: String,
    /// Native currency description
    pub native_currency: NativeCurrency,
    /// Per-request timeout applied by the transport
    pub request_timeout: Duration,
}

impl NetworkConfig {
    /// Network name for a chain id reported by the node.
    ///
    /// Falls back to `unknown (<id>)` when the node is on a different chain
    /// than the one configured.
    pub fn network_name(&self, reported_chain_id: u64) -> String {
        if reported_chain_id == self.chain_id {
            self.chain_name.clone()
        } else {
            format!("unknown ({reported_chain_id})")
        }
    }
}

/// The token contract this deployment talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    /// Token contract address
    pub token_address: String,
    /// Fixed spender used for allowance queries and approvals
    pub spender_address: String,
    /// Maximum amount a single write transaction may spend on fees
    pub max_spend: u64,
}

/// Configured method selectors, hex without the `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodHashConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: String,
    pub max_supply: String,
    pub total_supply: String,
    pub balance_of: String,
    pub allowance: String,
    pub approve: String,
    pub transfer: String,
    /// Used for any method without a dedicated selector
    pub default: String,
}
