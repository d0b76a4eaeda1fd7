//! All-or-nothing configuration loading.
//!
//! Every required key is checked before any value is parsed, so a single
//! failed load reports the complete list of missing keys.

use crate::network::{
    MethodHashConfig, NativeCurrency, NetworkConfig, TokenConfig, DEFAULT_MAX_SPEND,
    DEFAULT_REQUEST_TIMEOUT,
};
use alloy_primitives::hex;
use std::{collections::BTreeMap, path::Path, time::Duration};
use thiserror::Error;

pub const RPC_URL: &str = "RPC_URL";
pub const CHAIN_ID: &str = "CHAIN_ID";
pub const CHAIN_NAME: &str = "CHAIN_NAME";
pub const CURRENCY_NAME: &str = "CURRENCY_NAME";
pub const CURRENCY_SYMBOL: &str = "CURRENCY_SYMBOL";
pub const CURRENCY_DECIMALS: &str = "CURRENCY_DECIMALS";
pub const TOKEN_ADDRESS: &str = "TOKEN_ADDRESS";
pub const SPENDER_ADDRESS: &str = "SPENDER_ADDRESS";
pub const METHOD_HASH_NAME: &str = "METHOD_HASH_NAME";
pub const METHOD_HASH_SYMBOL: &str = "METHOD_HASH_SYMBOL";
pub const METHOD_HASH_DECIMALS: &str = "METHOD_HASH_DECIMALS";
pub const METHOD_HASH_MAX_SUPPLY: &str = "METHOD_HASH_MAX_SUPPLY";
pub const METHOD_HASH_TOTAL_SUPPLY: &str = "METHOD_HASH_TOTAL_SUPPLY";
pub const METHOD_HASH_BALANCE_OF: &str = "METHOD_HASH_BALANCE_OF";
pub const METHOD_HASH_ALLOWANCE: &str = "METHOD_HASH_ALLOWANCE";
pub const METHOD_HASH_APPROVE: &str = "METHOD_HASH_APPROVE";
pub const METHOD_HASH_TRANSFER: &str = "METHOD_HASH_TRANSFER";
pub const METHOD_HASH_DEFAULT: &str = "METHOD_HASH_DEFAULT";

pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
pub const MAX_SPEND: &str = "MAX_SPEND";
pub const WALLET_URL: &str = "WALLET_URL";

/// Keys that must be present and non-empty, in reporting order.
pub const REQUIRED_KEYS: [&str; 18] = [
    RPC_URL,
    CHAIN_ID,
    CHAIN_NAME,
    CURRENCY_NAME,
    CURRENCY_SYMBOL,
    CURRENCY_DECIMALS,
    TOKEN_ADDRESS,
    SPENDER_ADDRESS,
    METHOD_HASH_NAME,
    METHOD_HASH_SYMBOL,
    METHOD_HASH_DECIMALS,
    METHOD_HASH_MAX_SUPPLY,
    METHOD_HASH_TOTAL_SUPPLY,
    METHOD_HASH_BALANCE_OF,
    METHOD_HASH_ALLOWANCE,
    METHOD_HASH_APPROVE,
    METHOD_HASH_TRANSFER,
    METHOD_HASH_DEFAULT,
];

#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more required keys are absent or empty
    #[error(
        "Missing required environment variables: {}. Please check your .env file.",
        .keys.join(", ")
    )]
    Missing { keys: Vec<&'static str> },

    /// A key is present but its value cannot be used
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// Config file could not be read
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not a valid TOML table of strings
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Missing key names, empty for any other kind of failure.
    pub fn missing_keys(&self) -> &[&'static str] {
        match self {
            Self::Missing { keys } => keys,
            _ => &[],
        }
    }
}

/// Complete, validated application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub token: TokenConfig,
    pub method_hashes: MethodHashConfig,
    /// Optional wallet bridge endpoint
    pub wallet_url: Option<String>,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a TOML file holding a flat table of the same keys.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let table: BTreeMap<String, toml::Value> = toml::from_str(&contents)?;

        Self::from_lookup(|key| {
            table.get(key).map(|value| match value {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        })
    }

    /// Load through an arbitrary key lookup.
    ///
    /// Fails with [`ConfigError::Missing`] naming every absent key before
    /// attempting to parse anything.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let values = Values::collect(&lookup)?;

        let network = NetworkConfig {
            rpc_url: parse_url(RPC_URL, values.get(RPC_URL))?,
            chain_id: parse_chain_id(values.get(CHAIN_ID))?,
            chain_name: values.get(CHAIN_NAME).to_string(),
            native_currency: NativeCurrency {
                name: values.get(CURRENCY_NAME).to_string(),
                symbol: values.get(CURRENCY_SYMBOL).to_string(),
                decimals: parse_number(CURRENCY_DECIMALS, values.get(CURRENCY_DECIMALS))?,
            },
            request_timeout: optional(&lookup, REQUEST_TIMEOUT_SECS)
                .map(|v| parse_number(REQUEST_TIMEOUT_SECS, &v).map(Duration::from_secs))
                .transpose()?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        };

        let token = TokenConfig {
            token_address: values.get(TOKEN_ADDRESS).to_string(),
            spender_address: values.get(SPENDER_ADDRESS).to_string(),
            max_spend: optional(&lookup, MAX_SPEND)
                .map(|v| parse_number(MAX_SPEND, &v))
                .transpose()?
                .unwrap_or(DEFAULT_MAX_SPEND),
        };

        let method_hashes = MethodHashConfig {
            name: parse_selector(METHOD_HASH_NAME, values.get(METHOD_HASH_NAME))?,
            symbol: parse_selector(METHOD_HASH_SYMBOL, values.get(METHOD_HASH_SYMBOL))?,
            decimals: parse_selector(METHOD_HASH_DECIMALS, values.get(METHOD_HASH_DECIMALS))?,
            max_supply: parse_selector(METHOD_HASH_MAX_SUPPLY, values.get(METHOD_HASH_MAX_SUPPLY))?,
            total_supply: parse_selector(
                METHOD_HASH_TOTAL_SUPPLY,
                values.get(METHOD_HASH_TOTAL_SUPPLY),
            )?,
            balance_of: parse_selector(METHOD_HASH_BALANCE_OF, values.get(METHOD_HASH_BALANCE_OF))?,
            allowance: parse_selector(METHOD_HASH_ALLOWANCE, values.get(METHOD_HASH_ALLOWANCE))?,
            approve: parse_selector(METHOD_HASH_APPROVE, values.get(METHOD_HASH_APPROVE))?,
            transfer: parse_selector(METHOD_HASH_TRANSFER, values.get(METHOD_HASH_TRANSFER))?,
            default: parse_selector(METHOD_HASH_DEFAULT, values.get(METHOD_HASH_DEFAULT))?,
        };

        Ok(Self {
            network,
            token,
            method_hashes,
            wallet_url: optional(&lookup, WALLET_URL),
        })
    }
}

/// Required values, guaranteed present once collected.
struct Values(BTreeMap<&'static str, String>);

impl Values {
    fn collect<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = BTreeMap::new();
        let mut missing = Vec::new();

        for key in REQUIRED_KEYS {
            match optional(lookup, key) {
                Some(value) => {
                    values.insert(key, value);
                }
                None => missing.push(key),
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::Missing { keys: missing });
        }

        Ok(Self(values))
    }

    fn get(&self, key: &'static str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or_default()
    }
}

/// Present and non-blank value for `key`.
fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_url(key: &'static str, value: &str) -> Result<String, ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.to_string())
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: format!("expected an http(s) url, got {value:?}"),
        })
    }
}

fn parse_chain_id(value: &str) -> Result<u64, ConfigError> {
    let parsed = match value.strip_prefix("0x") {
        Some(hex_digits) => u64::from_str_radix(hex_digits, 16),
        None => value.parse(),
    };

    parsed.map_err(|e| ConfigError::Invalid {
        key: CHAIN_ID,
        reason: e.to_string(),
    })
}

fn parse_number<N>(key: &'static str, value: &str) -> Result<N, ConfigError>
where
    N: std::str::FromStr,
    N::Err: std::fmt::Display,
{
    value.parse().map_err(|e: N::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

/// Normalise a selector to lowercase hex without `0x`.
fn parse_selector(key: &'static str, value: &str) -> Result<String, ConfigError> {
    let bytes = hex::decode(value).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })?;

    if bytes.is_empty() {
        return Err(ConfigError::Invalid {
            key,
            reason: "selector is empty".to_string(),
        });
    }

    Ok(hex::encode(bytes))
}
