//! Connection lifecycle and user-facing state.
//!
//! [`Session`] drives the wallet connection through its three states and
//! keeps the connected account's data in step with it. [`TransactionModal`]
//! tracks one submitted write, and [`Notice`] turns any error into the single
//! signal the user sees.

pub mod connection;
pub mod modal;
pub mod notice;

pub use connection::{ConnectionState, Session, SessionState};
pub use modal::{TransactionModal, TransactionStatus};
pub use notice::{Notice, Severity};

use client::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// Requested transition is not part of the connection lifecycle
    #[error("Cannot move from {from} to {to}")]
    InvalidTransition {
        from: ConnectionState,
        to: ConnectionState,
    },

    /// Wallet granted access but returned no account
    #[error("No accounts found")]
    NoAccounts,

    #[error("Failed to connect wallet: {0}")]
    Connect(#[source] ClientError),

    #[error("Failed to disconnect wallet: {0}")]
    Disconnect(#[source] ClientError),
}
