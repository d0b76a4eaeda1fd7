use client::ClientError;
use codec::{AmountError, CodecError};
use std::fmt;
use thiserror::Error;

/// The user-facing operation an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchMetadata,
    FetchBalance,
    FetchConnectedData,
    ResolveAddress,
    Transfer,
    Approve,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::FetchMetadata => "Failed to fetch token metadata",
            Self::FetchBalance => "Failed to fetch token balance",
            Self::FetchConnectedData => "Failed to fetch account data",
            Self::ResolveAddress => "Failed to resolve address",
            Self::Transfer => "Failed to transfer tokens",
            Self::Approve => "Failed to approve tokens",
        };
        f.write_str(message)
    }
}

/// Input rejected before anything is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0:?} is neither a public key nor a recognised address")]
    InvalidRecipient(String),

    #[error("No public key is known for {0}")]
    UnknownAddress(String),

    #[error(transparent)]
    Amount(#[from] AmountError),
}

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Transport or node failure
    #[error("{operation}: {source}")]
    Rpc {
        operation: Operation,
        source: ClientError,
    },

    /// Node answered with something the codec cannot use
    #[error("{operation}: {source}")]
    Decode {
        operation: Operation,
        source: CodecError,
    },

    #[error("{operation}: {source}")]
    Validation {
        operation: Operation,
        source: ValidationError,
    },

    /// Simulation reported that the transaction would fail; nothing was sent
    #[error("{operation}: transaction would revert: {reason}")]
    Reverted { operation: Operation, reason: String },

    #[error("No connected account")]
    MissingIdentity,
}

impl ServiceError {
    pub(crate) fn rpc(operation: Operation) -> impl Fn(ClientError) -> Self {
        move |source| Self::Rpc { operation, source }
    }

    pub(crate) fn decode(operation: Operation) -> impl Fn(CodecError) -> Self {
        move |source| Self::Decode { operation, source }
    }

    pub(crate) fn invalid(operation: Operation, source: impl Into<ValidationError>) -> Self {
        Self::Validation {
            operation,
            source: source.into(),
        }
    }

    /// Whether the input was rejected before any request was made.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
