//! BIP32 hierarchical deterministic key derivation.
//!
//! Implements master key derivation and child derivation (hardened + normal).
//! Handles edge cases per BIP32 (IL >= n, key == 0).

#![forbid(unsafe_code)]

use crate::path::{DerivationPath, DerivationStep};
use eth_vanity_core::{Error, Result};
use eth_vanity_crypto::hmac::{hmac_sha512, hmac_sha512_parts};
use eth_vanity_crypto::secp256k1::pubkey::PublicKey;
use eth_vanity_crypto::secp256k1::scalar::Scalar;
use std::fmt;

/// Hardened derivation flag.
pub const HARDENED: u32 = 0x80000000;

/// HMAC key for the master node. Changing it yields an unrelated key tree.
pub const MASTER_KEY_DOMAIN: &[u8] = b"Bitcoin seed";

/// Extended private key (private key + chain code).
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedPrivateKey {
    /// Private scalar, always in 1..n
    key: Scalar,
    /// 32-byte chain code
    chain_code: [u8; 32],
}

impl ExtendedPrivateKey {
    /// Derive master key from BIP39 seed.
    ///
    /// Uses HMAC-SHA512("Bitcoin seed", seed) per BIP32.
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        if seed.len() < 16 || seed.len() > 64 {
            return Err(Error::InvalidKey(format!(
                "seed must be 16 to 64 bytes, got {}",
                seed.len()
            )));
        }

        let hmac = hmac_sha512(MASTER_KEY_DOMAIN, seed)?;
        let (key, chain_code) = split_hmac(&hmac);

        let key = Scalar::from_bytes(&key).ok_or(Error::InvalidChildKey)?;
        if key.is_zero() {
            return Err(Error::InvalidChildKey);
        }

        Ok(Self { key, chain_code })
    }

    /// Derive the child key for one path step.
    ///
    /// Hardened: Data = 0x00 || key || be32(index + 2^31)
    /// Normal:   Data = compressed_pubkey || be32(index)
    pub fn derive_child(&self, step: &DerivationStep) -> Result<Self> {
        let index = step.child_number().to_be_bytes();

        let hmac = if step.is_hardened() {
            let key = self.key.to_bytes();
            hmac_sha512_parts(&self.chain_code, &[&[0x00], &key, &index])?
        } else {
            let pubkey = self.public_key()?.compressed();
            hmac_sha512_parts(&self.chain_code, &[&pubkey, &index])?
        };
        let (il, chain_code) = split_hmac(&hmac);

        // IL >= n is rejected, not reduced
        let il = Scalar::from_bytes(&il).ok_or(Error::InvalidChildKey)?;

        // Child key = IL + parent_key (mod n)
        let key = il.add(&self.key);
        if key.is_zero() {
            return Err(Error::InvalidChildKey);
        }

        Ok(Self { key, chain_code })
    }

    /// Walk `path` down from this key. The empty path returns a copy of self.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self> {
        let mut current = self.clone();
        for step in path.steps() {
            current = current.derive_child(step)?;
        }
        Ok(current)
    }

    /// Get the raw 32-byte private key.
    pub fn private_key(&self) -> [u8; 32] {
        self.key.to_bytes()
    }

    /// Get the private key as a Scalar.
    pub fn private_key_scalar(&self) -> &Scalar {
        &self.key
    }

    /// Get the 32-byte chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Public point of the private key.
    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_private_key(&self.key).ok_or(Error::InvalidChildKey)
    }
}

impl fmt::Debug for ExtendedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedPrivateKey")
            .field("key", &"<redacted>")
            .field("chain_code", &"<redacted>")
            .finish()
    }
}

/// Derive the key at `path` from a BIP39 seed.
pub fn derive(seed: &[u8], path: &DerivationPath) -> Result<ExtendedPrivateKey> {
    ExtendedPrivateKey::from_seed(seed)?.derive_path(path)
}

fn split_hmac(hmac: &[u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&hmac[..32]);
    right.copy_from_slice(&hmac[32..]);
    (left, right)
}
