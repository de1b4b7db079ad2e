//! Keccak-256 (the pre-standard SHA-3 padding used by Ethereum).

#![forbid(unsafe_code)]

use sha3::{Digest, Keccak256};

/// Compute Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// Compute Keccak-256 and render it as 64 lower-case hex digits.
pub fn keccak256_hex(data: &[u8]) -> String {
    keccak256(data).iter().map(|b| format!("{:02x}", b)).collect()
}
