//! OP_20 token interaction service.
//!
//! [`TokenService`] is the context object every caller shares: it owns the
//! transport to the node, the token and spender addresses, and the selector
//! table, and exposes the reads and writes the UI needs.

pub mod error;
pub mod identity;
pub mod service;

pub use error::{Operation, ServiceError, ValidationError};
pub use identity::{AddressType, Recipient};
pub use service::TokenService;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Immutable snapshot of the token's descriptive data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Supply cap in base units
    pub max_supply: U256,
    /// Circulating supply in base units
    pub total_supply: U256,
}

/// Balance and allowance of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub balance: U256,
    /// Amount the configured spender may move on the holder's behalf
    pub allowance: U256,
}

/// Everything shown for the connected account; replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedData {
    pub user_balance: U256,
    pub allowance: U256,
    pub network_name: String,
}
