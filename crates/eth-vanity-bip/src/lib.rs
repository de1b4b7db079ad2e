//! BIP39/BIP32 implementation and derivation paths.

#![forbid(unsafe_code)]

pub mod bip32;
pub mod bip39;
pub mod path;

pub use crate::bip32::{derive, ExtendedPrivateKey, HARDENED};
pub use crate::bip39::RootSecret;
pub use crate::path::{DerivationPath, DerivationStep, DEFAULT_PATH};
