//! Hand-rolled call encoding for the OP_20 token.
//!
//! This is deliberately not a general ABI codec: parameters are fixed-width
//! words and return values are limited to `string`, `uint8`, `uint256` and
//! `bool`. It covers exactly the method set in [`Method`].

pub mod abi;
pub mod amount;
pub mod method;

pub use abi::{decode_return_value, encode_function_call, revert_reason, DecodedValue, Param};
pub use amount::{from_fixed_point, to_fixed_point, validate_amount, AmountError};
pub use method::{Method, MethodHashes};

use thiserror::Error;

/// Errors while building calldata or decoding results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Method hash not configured for {0}")]
    UnconfiguredMethod(&'static str),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid ABI encoding: {0}")]
    InvalidEncoding(String),

    #[error("expected {expected}, got {actual}")]
    UnexpectedType {
        expected: &'static str,
        actual: &'static str,
    },
}
