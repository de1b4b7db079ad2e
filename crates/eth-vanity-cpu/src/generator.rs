//! Single attempt of the vanity search.
//!
//! Full pipeline: entropy → mnemonic → seed → derived key → pubkey → checksummed address

#![forbid(unsafe_code)]

use eth_vanity_bip::{DerivationPath, RootSecret};
use eth_vanity_core::Result;
use eth_vanity_keystore::{AccountStore, DerivedAccount};
use rand::{CryptoRng, RngCore};
use std::collections::BTreeMap;
use std::fmt;

/// A fresh root secret and the account it yields at one path.
#[derive(Clone)]
pub struct Candidate {
    secret: RootSecret,
    path: DerivationPath,
    account: DerivedAccount,
}

impl Candidate {
    /// Draw 256 bits of entropy from `rng` and derive the account at `path`.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R, path: &DerivationPath) -> Result<Self> {
        Self::from_secret(RootSecret::generate(rng)?, path)
    }

    /// Entropy must be 16, 20, 24, 28, or 32 bytes.
    pub fn from_entropy(entropy: &[u8], path: &DerivationPath) -> Result<Self> {
        Self::from_secret(RootSecret::from_entropy(entropy)?, path)
    }

    pub fn from_secret(secret: RootSecret, path: &DerivationPath) -> Result<Self> {
        let account = DerivedAccount::from_secret(&secret, path)?;
        Ok(Self {
            secret,
            path: path.clone(),
            account,
        })
    }

    /// Checksummed address, `0x` prefixed.
    pub fn address(&self) -> &str {
        &self.account.address_checksummed
    }

    pub fn account(&self) -> &DerivedAccount {
        &self.account
    }

    pub fn secret(&self) -> &RootSecret {
        &self.secret
    }

    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    /// Store holding exactly this candidate's path and account.
    pub fn into_store(self) -> AccountStore {
        let accounts = BTreeMap::from([(self.path.to_string(), self.account)]);
        AccountStore::from_parts(
            self.secret.mnemonic(),
            self.secret.entropy().to_vec(),
            accounts,
        )
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("address", &self.address())
            .field("path", &self.path.to_string())
            .field("mnemonic", &"<redacted>")
            .finish()
    }
}
