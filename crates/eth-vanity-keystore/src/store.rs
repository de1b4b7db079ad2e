//! Root secret plus the accounts derived from it.

#![forbid(unsafe_code)]

use crate::account::{DerivedAccount, PASSPHRASE};
use eth_vanity_bip::{DerivationPath, RootSecret};
use eth_vanity_core::Result;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Mnemonic, entropy, and a map from path text to derived account.
///
/// Every entry re-derives to its stored value when replayed against
/// `mnemonic`; [`AccountStore::verify`] checks this. Paths loaded from a
/// key file whose entry could not be decoded are kept as incomplete until
/// they are derived again.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "crate::persist::StoreRecord", into = "crate::persist::StoreRecord")]
pub struct AccountStore {
    mnemonic: String,
    entropy: Vec<u8>,
    accounts: BTreeMap<String, DerivedAccount>,
    incomplete: BTreeSet<String>,
}

impl AccountStore {
    /// Empty store for `secret`.
    pub fn new(secret: &RootSecret) -> Self {
        Self {
            mnemonic: secret.mnemonic().to_string(),
            entropy: secret.entropy().to_vec(),
            accounts: BTreeMap::new(),
            incomplete: BTreeSet::new(),
        }
    }

    /// Fresh secret with one account at `path`.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R, path: &DerivationPath) -> Result<Self> {
        let secret = RootSecret::generate(rng)?;
        Self::with_account(&secret, path)
    }

    /// Store for `secret` holding exactly the account at `path`.
    pub fn with_account(secret: &RootSecret, path: &DerivationPath) -> Result<Self> {
        let account = DerivedAccount::from_secret(secret, path)?;
        let mut store = Self::new(secret);
        store.accounts.insert(path.to_string(), account);
        Ok(store)
    }

    /// Assemble a store from already-known parts. Nothing is re-derived.
    pub fn from_parts(
        mnemonic: impl Into<String>,
        entropy: Vec<u8>,
        accounts: BTreeMap<String, DerivedAccount>,
    ) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            entropy,
            accounts,
            incomplete: BTreeSet::new(),
        }
    }

    /// Record paths that exist in a key file without a usable account.
    pub(crate) fn with_incomplete(mut self, paths: BTreeSet<String>) -> Self {
        self.incomplete = paths
            .into_iter()
            .filter(|path| !self.accounts.contains_key(path))
            .collect();
        self
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    pub fn entropy(&self) -> &[u8] {
        &self.entropy
    }

    pub fn accounts(&self) -> &BTreeMap<String, DerivedAccount> {
        &self.accounts
    }

    /// Paths waiting to be re-derived because their stored entry was unusable.
    pub fn incomplete(&self) -> &BTreeSet<String> {
        &self.incomplete
    }

    /// Account stored under the textual path `path`.
    pub fn get(&self, path: &str) -> Option<&DerivedAccount> {
        self.accounts.get(path)
    }

    /// Number of paths, incomplete ones included.
    pub fn len(&self) -> usize {
        self.accounts.len() + self.incomplete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.incomplete.is_empty()
    }

    /// Re-derive the account at `path` and insert or overwrite its entry.
    ///
    /// Fails with `MissingMnemonic` for a blank mnemonic and
    /// `InvalidMnemonic` when word list or checksum validation fails.
    /// Other entries are left alone.
    pub fn add_or_refresh_path(&mut self, path: &DerivationPath) -> Result<&DerivedAccount> {
        let seed = self.seed()?;
        let account = DerivedAccount::derive(&seed, path)?;

        self.incomplete.remove(&path.to_string());
        let entry = match self.accounts.entry(path.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(account);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(account),
        };
        Ok(entry)
    }

    /// Re-derive every stored path.
    ///
    /// All entries are computed before any is replaced, so an error leaves
    /// the store as it was.
    pub fn refresh_all(&mut self) -> Result<()> {
        let refreshed = self.rederive_all()?;
        for (key, account) in refreshed {
            self.accounts.insert(key, account);
        }
        self.incomplete.clear();
        Ok(())
    }

    /// Paths whose stored account differs from a fresh derivation or is
    /// missing altogether.
    pub fn verify(&self) -> Result<Vec<String>> {
        let refreshed = self.rederive_all()?;
        Ok(refreshed
            .into_iter()
            .filter(|(key, account)| self.accounts.get(key) != Some(account))
            .map(|(key, _)| key)
            .collect())
    }

    fn rederive_all(&self) -> Result<Vec<(String, DerivedAccount)>> {
        let seed = self.seed()?;
        self.accounts
            .keys()
            .chain(&self.incomplete)
            .map(|key| {
                let path = DerivationPath::parse(key)?;
                Ok((key.clone(), DerivedAccount::derive(&seed, &path)?))
            })
            .collect()
    }

    fn seed(&self) -> Result<[u8; 64]> {
        Ok(RootSecret::from_mnemonic(&self.mnemonic)?.seed(PASSPHRASE))
    }
}

impl fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountStore")
            .field("mnemonic", &"<redacted>")
            .field("entropy", &"<redacted>")
            .field("accounts", &self.accounts)
            .field("incomplete", &self.incomplete)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eth_vanity_core::Error;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const REPEAT: &str =
        "repeat repeat repeat repeat repeat repeat repeat repeat repeat repeat repeat rescue";

    fn path(text: &str) -> DerivationPath {
        text.parse().unwrap()
    }

    fn repeat_store() -> AccountStore {
        AccountStore::new(&RootSecret::from_mnemonic(REPEAT).unwrap())
    }

    #[test]
    fn test_add_path() {
        let mut store = repeat_store();
        let account = store.add_or_refresh_path(&path("m/44'/60'/0'/0/0")).unwrap();
        assert_eq!(
            account.address_checksummed,
            "0x114A781017506df34B3Ed4C0E6B438889a6Eb3F7"
        );

        store.add_or_refresh_path(&path("m/44'/60'/0'/0/1")).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get("m/44'/60'/0'/0/1").unwrap().address_checksummed,
            "0x3d2F2242a7B705E7865c38a68989A7cde6b6f8Ad"
        );
    }

    #[test]
    fn test_add_overwrites_stale_entry() {
        let mut store = repeat_store();
        store.add_or_refresh_path(&path("m/44'/60'/0'/0/0")).unwrap();
        let fresh = store.get("m/44'/60'/0'/0/0").unwrap().clone();

        store
            .accounts
            .get_mut("m/44'/60'/0'/0/0")
            .unwrap()
            .address_checksummed = "stale".to_string();
        let refreshed = store.add_or_refresh_path(&path("m/44'/60'/0'/0/0")).unwrap();
        assert_eq!(refreshed, &fresh);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_root_path_key() {
        let mut store = repeat_store();
        store.add_or_refresh_path(&DerivationPath::root()).unwrap();
        assert!(store.get("m").is_some());
    }

    #[test]
    fn test_refresh_all_idempotent() {
        let mut store = repeat_store();
        for i in 0..3 {
            store.add_or_refresh_path(&DerivationPath::ethereum(i).unwrap()).unwrap();
        }
        let before = store.clone();
        store.refresh_all().unwrap();
        assert_eq!(store, before);
        assert!(store.verify().unwrap().is_empty());
    }

    #[test]
    fn test_refresh_all_repairs_and_verify_reports() {
        let mut store = repeat_store();
        store.add_or_refresh_path(&path("m/44'/60'/0'/0/0")).unwrap();
        store.add_or_refresh_path(&path("m/44'/60'/0'/0/1")).unwrap();
        let good = store.clone();

        store.accounts.get_mut("m/44'/60'/0'/0/1").unwrap().private_key = [7u8; 32];
        assert_eq!(store.verify().unwrap(), vec!["m/44'/60'/0'/0/1".to_string()]);

        store.refresh_all().unwrap();
        assert_eq!(store, good);
    }

    #[test]
    fn test_missing_mnemonic() {
        let mut store = AccountStore::from_parts("  ", Vec::new(), BTreeMap::new());
        assert_eq!(
            store.add_or_refresh_path(&DerivationPath::root()).unwrap_err(),
            Error::MissingMnemonic
        );
        assert_eq!(store.refresh_all(), Err(Error::MissingMnemonic));
    }

    #[test]
    fn test_invalid_mnemonic_leaves_store_untouched() {
        let mut good = repeat_store();
        good.add_or_refresh_path(&path("m/44'/60'/0'/0/0")).unwrap();

        let mut store = AccountStore::from_parts(
            REPEAT.replace("rescue", "repeat"),
            Vec::new(),
            good.accounts.clone(),
        );
        let before = store.clone();
        assert!(matches!(store.refresh_all(), Err(Error::InvalidMnemonic(_))));
        assert!(matches!(
            store.add_or_refresh_path(&path("m/44'/60'/0'/0/1")),
            Err(Error::InvalidMnemonic(_))
        ));
        assert_eq!(store, before);
    }

    #[test]
    fn test_refresh_all_bad_key_leaves_store_untouched() {
        let mut store = repeat_store();
        store.add_or_refresh_path(&path("m/44'/60'/0'/0/0")).unwrap();
        let account = store.get("m/44'/60'/0'/0/0").unwrap().clone();
        store.accounts.insert("not-a-path".to_string(), account);
        store.accounts.get_mut("m/44'/60'/0'/0/0").unwrap().private_key = [1u8; 32];

        let before = store.clone();
        assert!(matches!(store.refresh_all(), Err(Error::InvalidPath(_))));
        assert_eq!(store, before);
    }

    #[test]
    fn test_incomplete_paths_verified_and_refreshed() {
        let mut store = repeat_store();
        store.add_or_refresh_path(&path("m/44'/60'/0'/0/1")).unwrap();
        let store = store.with_incomplete(BTreeSet::from([
            "m/44'/60'/0'/0/0".to_string(),
            "m/44'/60'/0'/0/1".to_string(),
        ]));

        // A path that already has an account is not incomplete
        assert_eq!(store.incomplete().len(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.verify().unwrap(), vec!["m/44'/60'/0'/0/0".to_string()]);

        let mut refreshed = store.clone();
        refreshed.refresh_all().unwrap();
        assert!(refreshed.incomplete().is_empty());
        assert_eq!(refreshed.len(), 2);
        assert_eq!(
            refreshed.get("m/44'/60'/0'/0/0").unwrap().address_checksummed,
            "0x114A781017506df34B3Ed4C0E6B438889a6Eb3F7"
        );

        let mut added = store;
        added.add_or_refresh_path(&path("m/44'/60'/0'/0/0")).unwrap();
        assert!(added.incomplete().is_empty());
        assert_eq!(added, refreshed);
    }

    #[test]
    fn test_incomplete_path_failure_leaves_store_untouched() {
        let mut store = AccountStore::from_parts(REPEAT, Vec::new(), BTreeMap::new())
            .with_incomplete(BTreeSet::from(["m/x".to_string()]));
        let before = store.clone();

        assert!(matches!(store.refresh_all(), Err(Error::InvalidPath(_))));
        assert_eq!(store, before);
    }

    #[test]
    fn test_generate_single_entry() {
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        let store = AccountStore::generate(&mut rng, &path("m/44'/60'/0'/0/0")).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.mnemonic().split_whitespace().count(), 24);
        assert_eq!(store.entropy().len(), 32);
        assert!(store.verify().unwrap().is_empty());
    }

    #[test]
    fn test_debug_redacts_mnemonic() {
        let debug_str = format!("{:?}", repeat_store());
        assert!(!debug_str.contains("repeat"));
        assert!(debug_str.contains("<redacted>"));
    }
}
