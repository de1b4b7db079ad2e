//! Key file reading and writing.
//!
//! One JSON document per store:
//!
//! ```json
//! {
//!   "mnemonic": "...",
//!   "entropy": "0x...",
//!   "ethereumAccounts": {
//!     "m/44'/60'/0'/0/0": {
//!       "privateKey": "0x...", "privateKeyString": "0x...",
//!       "publicKey": "0x...", "publicKeyString": "0x...",
//!       "address": "0x...", "addressString": "0x..."
//!     }
//!   }
//! }
//! ```
//!
//! Byte fields are `0x`-prefixed lower-case hex; empty fields are omitted.
//! An account entry that does not decode is loaded as an incomplete path
//! and written back as `{}` until it is derived again.

#![forbid(unsafe_code)]

use crate::account::{prefixed_hex, DerivedAccount};
use crate::store::AccountStore;
use eth_vanity_core::Error;
use eth_vanity_crypto::secp256k1::pubkey::decompress;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Failure reading or writing a key file.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// On-disk shape of [`AccountStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoreRecord {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    mnemonic: String,
    #[serde(default, with = "hex_bytes", skip_serializing_if = "Vec::is_empty")]
    entropy: Vec<u8>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    ethereum_accounts: BTreeMap<String, AccountRecord>,
}

/// On-disk shape of [`DerivedAccount`]. The `*String` fields are display
/// copies; only `addressString` carries information the bytes do not.
///
/// Byte fields stay text until conversion so one bad entry does not reject
/// the whole document.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    private_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    private_key_string: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    public_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    public_key_string: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    address_string: String,
}

impl From<AccountStore> for StoreRecord {
    fn from(store: AccountStore) -> Self {
        let mut ethereum_accounts: BTreeMap<_, _> = store
            .accounts()
            .iter()
            .map(|(key, account)| (key.clone(), AccountRecord::from(account)))
            .collect();
        for key in store.incomplete() {
            ethereum_accounts.insert(key.clone(), AccountRecord::default());
        }

        Self {
            mnemonic: store.mnemonic().to_string(),
            entropy: store.entropy().to_vec(),
            ethereum_accounts,
        }
    }
}

impl From<StoreRecord> for AccountStore {
    fn from(record: StoreRecord) -> Self {
        let mut accounts = BTreeMap::new();
        let mut incomplete = BTreeSet::new();

        for (key, account) in record.ethereum_accounts {
            match DerivedAccount::try_from(account) {
                Ok(account) => {
                    accounts.insert(key, account);
                }
                Err(e) => {
                    warn!(path = %key, error = %e, "unusable key file entry, refresh re-derives it");
                    incomplete.insert(key);
                }
            }
        }

        AccountStore::from_parts(record.mnemonic, record.entropy, accounts)
            .with_incomplete(incomplete)
    }
}

impl From<&DerivedAccount> for AccountRecord {
    fn from(account: &DerivedAccount) -> Self {
        Self {
            private_key: account.private_key_hex(),
            private_key_string: account.private_key_hex(),
            public_key: account.public_key_hex(),
            public_key_string: account.public_key_hex(),
            address: account.address_hex(),
            address_string: account.address_checksummed.clone(),
        }
    }
}

impl TryFrom<AccountRecord> for DerivedAccount {
    type Error = Error;

    fn try_from(record: AccountRecord) -> Result<Self, Error> {
        let private_key: [u8; 32] = fixed(&record.private_key, "privateKey")?;
        let public_key_compressed: [u8; 33] = fixed(&record.public_key, "publicKey")?;
        let address: [u8; 20] = fixed(&record.address, "address")?;

        Ok(DerivedAccount {
            private_key,
            public_key_compressed,
            public_key_uncompressed: decompress(&public_key_compressed)?,
            address,
            address_checksummed: record.address_string,
        })
    }
}

fn fixed<const N: usize>(text: &str, field: &str) -> Result<[u8; N], Error> {
    let bytes = hex::decode(strip_hex_prefix(text))
        .map_err(|e| Error::InvalidKey(format!("{}: {}", field, e)))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| Error::InvalidKey(format!("{} must be {} bytes, got {}", field, N, len)))
}

fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

/// Parse a store from JSON text.
pub fn from_json(text: &str) -> Result<AccountStore, PersistError> {
    Ok(serde_json::from_str(text)?)
}

/// Render a store as pretty-printed JSON.
pub fn to_json(store: &AccountStore) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(store)?)
}

/// Read the key file at `path`.
pub fn read_store(path: &Path) -> Result<AccountStore, PersistError> {
    let text = fs::read_to_string(path)?;
    let store = from_json(&text)?;
    debug!(path = %path.display(), accounts = store.len(), "read key file");
    Ok(store)
}

/// Write `store` to `path`, replacing any existing file.
///
/// The document goes to a sibling temp file first and is renamed into
/// place, so a failed write leaves the old file intact.
pub fn write_store(store: &AccountStore, path: &Path) -> Result<(), PersistError> {
    let text = to_json(store)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, text)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    debug!(path = %path.display(), accounts = store.len(), "wrote key file");
    Ok(())
}

/// Where a store for `address` goes when the user named `output`.
///
/// An existing directory gets `<address>.json` inside it; anything else is
/// used as the file path itself.
pub fn resolve_output(output: &Path, address: &str) -> PathBuf {
    if output.is_dir() {
        output.join(format!("{}.json", address))
    } else {
        output.to_path_buf()
    }
}

/// `0x` hex for `Vec<u8>` fields. Reading also accepts bare hex.
mod hex_bytes {
    use super::{prefixed_hex, strip_hex_prefix};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]>,
    {
        serializer.serialize_str(&prefixed_hex(bytes.as_ref()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        hex::decode(strip_hex_prefix(&text)).map_err(D::Error::custom)
    }
}
