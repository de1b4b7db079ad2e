//! Account store for eth-vanity.
//!
//! A store pairs a BIP39 mnemonic with the accounts derived from it, keyed
//! by derivation path text, and is persisted as one JSON key file.

pub mod account;
pub mod persist;
pub mod store;

pub use account::{DerivedAccount, PASSPHRASE};
pub use persist::{read_store, resolve_output, write_store, PersistError};
pub use store::AccountStore;
