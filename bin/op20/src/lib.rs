//! Command-line front end for one OP_20 token deployment.

pub mod render;

use client::{wallet::WalletProvider, Transport};
use config::{AppConfig, ConfigError};
use session::{Session, SessionError, TransactionModal};
use std::path::Path;
use token::{ServiceError, TokenBalance, TokenMetadata, TokenService};
use tracing::{info, warn};

/// Load configuration from `path` when given, otherwise from the environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading config file");
            AppConfig::from_file(path)
        }
        None => AppConfig::from_env(),
    }
}

/// A state-changing token call.
#[derive(Debug, Clone, Copy)]
pub enum Write<'a> {
    Transfer { to: &'a str, amount: &'a str },
    Approve { amount: &'a str },
}

/// Result of submitting a [`Write`].
#[derive(Debug)]
pub struct Submission {
    /// Account the session is connected with
    pub account: String,
    pub modal: TransactionModal,
    pub outcome: Result<String, ServiceError>,
    /// Reloading account data after a successful write failed
    pub refresh: Option<ServiceError>,
}

/// Connect if needed, submit `write` and track it in a modal.
///
/// `sender` overrides the connected account as the transaction origin.
/// After a successful write the session's account data is reloaded; a
/// failed reload is returned in [`Submission::refresh`], not as an error.
pub async fn submit<T, W>(
    service: &TokenService<T>,
    wallet: &W,
    session: &mut Session,
    write: Write<'_>,
    sender: Option<&str>,
) -> Result<Submission, SessionError>
where
    T: Transport,
    W: WalletProvider,
{
    let account = match session.account() {
        Some(account) => account,
        None => session.connect(wallet).await?,
    };
    let sender = sender.unwrap_or(&account);

    let mut modal = TransactionModal::submitted();
    let outcome = match write {
        Write::Transfer { to, amount } => service.transfer_tokens(wallet, to, amount, sender).await,
        Write::Approve { amount } => service.approve_tokens(wallet, amount, sender).await,
    };
    modal.resolve(&outcome);

    let mut refresh = None;
    if outcome.is_ok() {
        if let Err(err) = session.refresh(service).await {
            warn!(error = %err, "Failed to reload account data after write");
            refresh = Some(err);
        }
    }

    Ok(Submission {
        account,
        modal,
        outcome,
        refresh,
    })
}

/// Token metadata together with one holder's balance.
pub async fn balance_with_metadata<T: Transport>(
    service: &TokenService<T>,
    holder: &str,
) -> Result<(TokenMetadata, TokenBalance), ServiceError> {
    tokio::try_join!(service.get_token_metadata(), service.get_balance(holder))
}
