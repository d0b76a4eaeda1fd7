//! Contract bindings for the OP_20 token.
//!
//! Only the call and return types are generated; the `codec` crate does the
//! wire encoding by hand and uses these for canonical signatures.

pub mod token;
