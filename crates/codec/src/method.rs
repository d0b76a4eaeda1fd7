//! Contract methods and their selectors.

use crate::CodecError;
use alloy_primitives::hex;
use alloy_sol_types::SolCall;
use binding::token::IOP20;
use config::MethodHashConfig;
use std::collections::HashMap;

/// Every contract method the client calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Name,
    Symbol,
    Decimals,
    MaxSupply,
    TotalSupply,
    BalanceOf,
    Allowance,
    Approve,
    Transfer,
}

impl Method {
    pub const ALL: [Self; 9] = [
        Self::Name,
        Self::Symbol,
        Self::Decimals,
        Self::MaxSupply,
        Self::TotalSupply,
        Self::BalanceOf,
        Self::Allowance,
        Self::Approve,
        Self::Transfer,
    ];

    /// Canonical Solidity signature, e.g. `transfer(address,uint256)`.
    pub const fn signature(self) -> &'static str {
        match self {
            Self::Name => IOP20::nameCall::SIGNATURE,
            Self::Symbol => IOP20::symbolCall::SIGNATURE,
            Self::Decimals => IOP20::decimalsCall::SIGNATURE,
            Self::MaxSupply => IOP20::maxSupplyCall::SIGNATURE,
            Self::TotalSupply => IOP20::totalSupplyCall::SIGNATURE,
            Self::BalanceOf => IOP20::balanceOfCall::SIGNATURE,
            Self::Allowance => IOP20::allowanceCall::SIGNATURE,
            Self::Approve => IOP20::approveCall::SIGNATURE,
            Self::Transfer => IOP20::transferCall::SIGNATURE,
        }
    }

    /// Keccak-derived selector, as an EVM contract would expect.
    const fn keccak_selector(self) -> [u8; 4] {
        match self {
            Self::Name => IOP20::nameCall::SELECTOR,
            Self::Symbol => IOP20::symbolCall::SELECTOR,
            Self::Decimals => IOP20::decimalsCall::SELECTOR,
            Self::MaxSupply => IOP20::maxSupplyCall::SELECTOR,
            Self::TotalSupply => IOP20::totalSupplyCall::SELECTOR,
            Self::BalanceOf => IOP20::balanceOfCall::SELECTOR,
            Self::Allowance => IOP20::allowanceCall::SELECTOR,
            Self::Approve => IOP20::approveCall::SELECTOR,
            Self::Transfer => IOP20::transferCall::SELECTOR,
        }
    }
}

/// Selector table, hex without `0x`.
///
/// Lookups fall back to the default selector when a method has none of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodHashes {
    hashes: HashMap<Method, String>,
    default: Option<String>,
}

impl MethodHashes {
    /// Empty table; every lookup fails until selectors are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selectors derived from the method signatures with keccak256.
    pub fn keccak() -> Self {
        let hashes = Method::ALL
            .into_iter()
            .map(|method| (method, hex::encode(method.keccak_selector())))
            .collect();

        Self {
            hashes,
            default: None,
        }
    }

    /// Selectors supplied through configuration.
    pub fn from_config(config: &MethodHashConfig) -> Self {
        Self::new()
            .with(Method::Name, &config.name)
            .with(Method::Symbol, &config.symbol)
            .with(Method::Decimals, &config.decimals)
            .with(Method::MaxSupply, &config.max_supply)
            .with(Method::TotalSupply, &config.total_supply)
            .with(Method::BalanceOf, &config.balance_of)
            .with(Method::Allowance, &config.allowance)
            .with(Method::Approve, &config.approve)
            .with(Method::Transfer, &config.transfer)
            .with_default(&config.default)
    }

    /// Set the selector for one method.
    pub fn with(mut self, method: Method, selector: &str) -> Self {
        self.hashes.insert(method, normalize(selector));
        self
    }

    /// Set the fallback selector.
    pub fn with_default(mut self, selector: &str) -> Self {
        self.default = Some(normalize(selector));
        self
    }

    /// Selector for `method`.
    pub fn selector(&self, method: Method) -> Result<&str, CodecError> {
        self.hashes
            .get(&method)
            .or(self.default.as_ref())
            .map(String::as_str)
            .ok_or(CodecError::UnconfiguredMethod(method.signature()))
    }
}

fn normalize(selector: &str) -> String {
    let trimmed = selector.trim();
    trimmed
        .strip_prefix("0x")
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_table() {
        let hashes = MethodHashes::keccak();
        assert_eq!(hashes.selector(Method::Transfer).unwrap(), "a9059cbb");
        assert_eq!(hashes.selector(Method::TotalSupply).unwrap(), "18160ddd");
        assert_eq!(hashes.selector(Method::Name).unwrap(), "06fdde03");
    }

    #[test]
    fn test_unconfigured_method() {
        let hashes = MethodHashes::new().with(Method::Name, "0x01020304");

        assert_eq!(hashes.selector(Method::Name).unwrap(), "01020304");
        assert_eq!(
            hashes.selector(Method::Symbol),
            Err(CodecError::UnconfiguredMethod("symbol()"))
        );
    }

    #[test]
    fn test_default_fallback() {
        let hashes = MethodHashes::new()
            .with(Method::Name, "0xAABBCCDD")
            .with_default("0x99999999");

        assert_eq!(hashes.selector(Method::Name).unwrap(), "aabbccdd");
        assert_eq!(hashes.selector(Method::Approve).unwrap(), "99999999");
    }

    #[test]
    fn test_from_config() {
        let config = MethodHashConfig {
            name: "01".to_string(),
            symbol: "02".to_string(),
            decimals: "03".to_string(),
            max_supply: "04".to_string(),
            total_supply: "05".to_string(),
            balance_of: "06".to_string(),
            allowance: "07".to_string(),
            approve: "08".to_string(),
            transfer: "09".to_string(),
            default: "ff".to_string(),
        };

        let hashes = MethodHashes::from_config(&config);
        for (i, method) in Method::ALL.into_iter().enumerate() {
            assert_eq!(hashes.selector(method).unwrap(), format!("{:02x}", i + 1));
        }
    }
}
