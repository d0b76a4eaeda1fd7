//! Recipient and account identities.
//!
//! Contracts address accounts by a 32-byte public key. Users may instead
//! paste a Bitcoin-style address, whose type has to be detected before the
//! node can be asked for the key behind it.

use alloy_primitives::{hex, B256};
use bech32::segwit;

/// Human-readable parts of wallet addresses (mainnet, testnet, regtest).
const WALLET_HRPS: [&str; 3] = ["bc", "tb", "bcrt"];
/// Human-readable parts of contract addresses.
const CONTRACT_HRPS: [&str; 3] = ["op", "opt", "opr"];

/// Base58check version bytes (mainnet, testnet/regtest).
const P2PKH_VERSIONS: [u8; 2] = [0x00, 0x6f];
const P2SH_VERSIONS: [u8; 2] = [0x05, 0xc4];

/// Address shapes that can be resolved to a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    /// Taproot, bech32m witness v1
    P2tr,
    /// Native segwit key hash
    P2wpkh,
    /// Native segwit script hash
    P2wsh,
    /// Legacy key hash
    P2pkh,
    /// Legacy script hash
    P2sh,
    /// Contract address
    Contract,
}

/// A parsed transfer recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Usable as-is
    PublicKey(B256),
    /// Must be resolved through the node
    Address { address: String, kind: AddressType },
}

impl Recipient {
    /// Classify `input`, or `None` when it is neither a key nor a known address.
    ///
    /// Public keys are recognised first; type detection only runs for
    /// everything else.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(key) = parse_public_key(input) {
            return Some(Self::PublicKey(key));
        }

        detect_address_type(input).map(|kind| Self::Address {
            address: input.to_string(),
            kind,
        })
    }
}

/// Parse a hex public key: 32 bytes (x-only) or 33 bytes (compressed, the
/// prefix byte is dropped).
pub fn parse_public_key(input: &str) -> Option<B256> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let bytes = hex::decode(digits).ok()?;
    match (bytes.len(), bytes.first().copied()) {
        (32, _) => Some(B256::from_slice(&bytes)),
        (33, Some(0x02 | 0x03)) => Some(B256::from_slice(&bytes[1..])),
        _ => None,
    }
}

/// Work out which kind of address `input` is by decoding it.
///
/// Checksums are verified, so a mistyped address is rejected here rather
/// than by the node.
pub fn detect_address_type(input: &str) -> Option<AddressType> {
    detect_bech32(input).or_else(|| detect_base58(input))
}

fn detect_bech32(input: &str) -> Option<AddressType> {
    let (hrp, _) = input.rsplit_once('1')?;
    let hrp = hrp.to_ascii_lowercase();

    if CONTRACT_HRPS.contains(&hrp.as_str()) {
        let (_, data) = bech32::decode(input).ok()?;
        return (!data.is_empty()).then_some(AddressType::Contract);
    }
    if !WALLET_HRPS.contains(&hrp.as_str()) {
        return None;
    }

    // Also enforces bech32 for v0 and bech32m for v1+.
    let (_, version, program) = bech32::segwit::decode(input).ok()?;
    if version == segwit::VERSION_0 {
        match program.len() {
            20 => Some(AddressType::P2wpkh),
            32 => Some(AddressType::P2wsh),
            _ => None,
        }
    } else if version == segwit::VERSION_1 && program.len() == 32 {
        Some(AddressType::P2tr)
    } else {
        None
    }
}

fn detect_base58(input: &str) -> Option<AddressType> {
    let payload = bs58::decode(input).with_check(None).into_vec().ok()?;
    // Version byte and a 20-byte hash.
    if payload.len() != 21 {
        return None;
    }

    match payload[0] {
        v if P2PKH_VERSIONS.contains(&v) => Some(AddressType::P2pkh),
        v if P2SH_VERSIONS.contains(&v) => Some(AddressType::P2sh),
        _ => None,
    }
}
