//! Mixed-case checksum addresses.
//!
//! EIP-55:   hash = keccak256(lower(addr))
//! EIP-1191: hash = keccak256("{chain_id}0x" || lower(addr))
//!
//! Letter i of the address is upper-cased when hex digit i of the hash is
//! 8 or more. Decimal digits are never changed.

#![forbid(unsafe_code)]

use crate::address::ADDRESS_LEN;
use crate::chain::ChainId;
use eth_vanity_core::{Error, Result};
use eth_vanity_crypto::keccak::keccak256_hex;

/// Hex digits in an address.
const ADDRESS_HEX_LEN: usize = ADDRESS_LEN * 2;

/// Checksum a 40-digit hex address, with or without a `0x` prefix.
///
/// The input's case is ignored. A `0x` prefix on the input is kept on the
/// output; `0X` is not a prefix and fails validation.
pub fn checksum_address(address: &str, chain_id: Option<ChainId>) -> Result<String> {
    let (prefix, digits) = match address.strip_prefix("0x") {
        Some(digits) => ("0x", digits),
        None => ("", address),
    };

    if digits.len() != ADDRESS_HEX_LEN || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidAddress(format!(
            "'{}': expected 40 hex digits with optional 0x prefix",
            address
        )));
    }

    let lower = digits.to_ascii_lowercase();
    let mut out = String::with_capacity(prefix.len() + ADDRESS_HEX_LEN);
    out.push_str(prefix);
    out.push_str(&apply_checksum(&lower, chain_id));
    Ok(out)
}

/// Render raw address bytes as a `0x`-prefixed checksum address.
pub fn to_checksum(address: &[u8; ADDRESS_LEN], chain_id: Option<ChainId>) -> String {
    let lower: String = address.iter().map(|b| format!("{:02x}", b)).collect();
    format!("0x{}", apply_checksum(&lower, chain_id))
}

/// True if `address` is already in checksum form for `chain_id`.
pub fn is_checksum_valid(address: &str, chain_id: Option<ChainId>) -> bool {
    checksum_address(address, chain_id).map_or(false, |checksummed| checksummed == address)
}

/// `lower` must be exactly 40 lower-case hex digits.
fn apply_checksum(lower: &str, chain_id: Option<ChainId>) -> String {
    let hash = match chain_id {
        Some(id) => keccak256_hex(format!("{}0x{}", id, lower).as_bytes()),
        None => keccak256_hex(lower.as_bytes()),
    };

    lower
        .chars()
        .zip(hash.bytes())
        .map(|(c, h)| {
            if c.is_ascii_alphabetic() && matches!(h, b'8'..=b'9' | b'a'..=b'f') {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}
