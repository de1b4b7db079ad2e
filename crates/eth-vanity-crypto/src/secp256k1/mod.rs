//! secp256k1 scalar field and public key encodings, backed by `k256`.

#![forbid(unsafe_code)]

pub mod pubkey;
pub mod scalar;
