//! BIP39 root secrets.
//!
//! Entropy → Mnemonic (with SHA-256 checksum)
//! Mnemonic → Seed (PBKDF2-HMAC-SHA512, 2048 rounds, NFKD normalized)
//!
//! Word-list encoding and validation come from the `bip39` crate; this
//! module owns the entropy/mnemonic pair the rest of the workspace persists.

#![forbid(unsafe_code)]

use ::bip39::{Language, Mnemonic};
use eth_vanity_core::{Error, Result};
use rand::{CryptoRng, RngCore};
use std::fmt;

/// Entropy drawn for fresh secrets: 256 bits, a 24-word mnemonic.
pub const ENTROPY_BYTES: usize = 32;

/// Entropy plus the mnemonic phrase encoding it.
///
/// Never mutated after creation; `Debug` does not print either field.
#[derive(Clone, PartialEq, Eq)]
pub struct RootSecret {
    mnemonic: Mnemonic,
    phrase: String,
    entropy: Vec<u8>,
}

impl RootSecret {
    /// Draw 256 bits of fresh entropy from `rng`.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let mut entropy = [0u8; ENTROPY_BYTES];
        rng.fill_bytes(&mut entropy);
        Self::from_entropy(&entropy)
    }

    /// Entropy must be 16, 20, 24, 28, or 32 bytes.
    pub fn from_entropy(entropy: &[u8]) -> Result<Self> {
        if !matches!(entropy.len(), 16 | 20 | 24 | 28 | 32) {
            return Err(Error::InvalidEntropyLength {
                got: entropy.len(),
            });
        }
        let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
            .map_err(|e| Error::InvalidMnemonic(e.to_string()))?;
        Ok(Self::from_parsed(mnemonic))
    }

    /// Parse an English mnemonic, checking word list and checksum.
    pub fn from_mnemonic(phrase: &str) -> Result<Self> {
        if phrase.trim().is_empty() {
            return Err(Error::MissingMnemonic);
        }
        let mnemonic = Mnemonic::parse_in(Language::English, phrase)
            .map_err(|e| Error::InvalidMnemonic(e.to_string()))?;
        Ok(Self::from_parsed(mnemonic))
    }

    fn from_parsed(mnemonic: Mnemonic) -> Self {
        Self {
            phrase: mnemonic.to_string(),
            entropy: mnemonic.to_entropy(),
            mnemonic,
        }
    }

    /// Space-separated mnemonic words.
    pub fn mnemonic(&self) -> &str {
        &self.phrase
    }

    pub fn entropy(&self) -> &[u8] {
        &self.entropy
    }

    pub fn word_count(&self) -> usize {
        self.mnemonic.word_count()
    }

    /// 64-byte BIP39 seed for `passphrase` (empty for none).
    pub fn seed(&self, passphrase: &str) -> [u8; 64] {
        self.mnemonic.to_seed(passphrase)
    }
}

impl fmt::Debug for RootSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootSecret")
            .field("words", &self.word_count())
            .field("mnemonic", &"<redacted>")
            .field("entropy", &"<redacted>")
            .finish()
    }
}

/// Generate mnemonic from entropy bytes.
///
/// The entropy length determines the word count:
/// - 16 bytes → 12 words
/// - 20 bytes → 15 words
/// - 24 bytes → 18 words
/// - 28 bytes → 21 words
/// - 32 bytes → 24 words
pub fn entropy_to_mnemonic(entropy: &[u8]) -> Result<String> {
    RootSecret::from_entropy(entropy).map(|secret| secret.phrase)
}

/// Convert a mnemonic to its seed. The mnemonic is validated first.
pub fn mnemonic_to_seed(mnemonic: &str, passphrase: &str) -> Result<[u8; 64]> {
    RootSecret::from_mnemonic(mnemonic).map(|secret| secret.seed(passphrase))
}

/// Validate word list membership, word count and checksum.
pub fn validate_mnemonic(mnemonic: &str) -> bool {
    Mnemonic::parse_in(Language::English, mnemonic).is_ok()
}
