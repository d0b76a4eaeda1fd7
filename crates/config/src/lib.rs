//! Configuration for the OP_20 token client.
//!
//! This crate provides:
//! - The fixed list of required settings and the all-or-nothing loader
//! - Typed network, token and method-selector sections

pub mod loader;
pub mod network;

pub use loader::{AppConfig, ConfigError, REQUIRED_KEYS};
pub use network::{MethodHashConfig, NativeCurrency, NetworkConfig, TokenConfig};
