//! Plain-text rendering of results and notices.

use alloy_primitives::U256;
use codec::from_fixed_point;
use config::AppConfig;
use session::{Notice, Severity, TransactionModal, TransactionStatus};
use std::fmt::Write as _;
use token::{TokenBalance, TokenMetadata};

/// Render a notice. Blocking notices become a full screen listing every
/// missing key and how to fix it.
pub fn notice(notice: &Notice) -> String {
    let mut out = format!("{}: {}", notice.title, notice.message);

    if notice.severity == Severity::Blocking && !notice.details.is_empty() {
        out.push_str("\n\nMissing keys:");
        for key in &notice.details {
            let _ = write!(out, "\n  - {key}");
        }
        out.push_str(
            "\n\nSet these keys in the environment or in the file passed with --config, then run again.",
        );
    }

    out
}

/// Amount in token units, or base units when the decimals are unusable.
pub fn amount(value: U256, decimals: u8) -> String {
    from_fixed_point(value, decimals).unwrap_or_else(|_| value.to_string())
}

pub fn metadata(metadata: &TokenMetadata) -> String {
    format!(
        "{} ({})\n  decimals:     {}\n  max supply:   {}\n  total supply: {}",
        metadata.name,
        metadata.symbol,
        metadata.decimals,
        amount(metadata.max_supply, metadata.decimals),
        amount(metadata.total_supply, metadata.decimals),
    )
}

pub fn balance(holder: &str, metadata: &TokenMetadata, balance: &TokenBalance) -> String {
    format!(
        "{holder}\n  balance:   {} {}\n  allowance: {} {}",
        amount(balance.balance, metadata.decimals),
        metadata.symbol,
        amount(balance.allowance, metadata.decimals),
        metadata.symbol,
    )
}

pub fn modal(modal: &TransactionModal) -> String {
    match modal.status {
        TransactionStatus::Pending => "Transaction pending".to_string(),
        TransactionStatus::Success => format!("Transaction sent: {}", modal.transaction_hash),
        TransactionStatus::Failed => format!(
            "Transaction failed: {}",
            modal.error_message.as_deref().unwrap_or("unknown error")
        ),
    }
}

pub fn config_summary(config: &AppConfig) -> String {
    let network = &config.network;
    let hashes = &config.method_hashes;

    let mut out = format!(
        "Configuration OK\n  rpc:      {}\n  chain:    {} ({})\n  currency: {} ({}, {} decimals)\n  token:    {}\n  spender:  {}\n  wallet:   {}",
        network.rpc_url,
        network.chain_name,
        network.chain_id,
        network.native_currency.name,
        network.native_currency.symbol,
        network.native_currency.decimals,
        config.token.token_address,
        config.token.spender_address,
        config.wallet_url.as_deref().unwrap_or("not set"),
    );

    out.push_str("\n  selectors:");
    for (name, selector) in [
        ("name", &hashes.name),
        ("symbol", &hashes.symbol),
        ("decimals", &hashes.decimals),
        ("maxSupply", &hashes.max_supply),
        ("totalSupply", &hashes.total_supply),
        ("balanceOf", &hashes.balance_of),
        ("allowance", &hashes.allowance),
        ("approve", &hashes.approve),
        ("transfer", &hashes.transfer),
        ("default", &hashes.default),
    ] {
        let _ = write!(out, "\n    {name:<12} 0x{selector}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::ConfigError;

    #[test]
    fn test_blocking_notice_lists_keys() {
        let err = ConfigError::Missing {
            keys: vec!["TOKEN_ADDRESS", "SPENDER_ADDRESS"],
        };
        let screen = notice(&Notice::from_error(&err));

        assert!(screen.starts_with("Configuration Error: Missing required environment variables"));
        assert!(screen.contains("\n  - TOKEN_ADDRESS\n  - SPENDER_ADDRESS\n"));
    }

    #[test]
    fn test_amount_formatting() {
        assert_eq!(amount(U256::from(1_500_000_000_000_000_000u128), 18), "1.5");
        assert_eq!(amount(U256::from(42), 0), "42");
        assert_eq!(amount(U256::from(42), 90), "42");
    }

    #[test]
    fn test_failed_modal() {
        let mut failed = TransactionModal::submitted();
        failed.resolve::<&str>(&Err("User rejected the request"));
        assert_eq!(modal(&failed), "Transaction failed: User rejected the request");
    }
}
