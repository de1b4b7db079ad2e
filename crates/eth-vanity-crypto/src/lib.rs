//! Cryptographic collaborators for eth-vanity.
//!
//! Thin wrappers over `sha3`, `hmac`/`sha2` and `k256`, plus the SEC1 point
//! encodings the HD key tree and address derivation depend on.

#![forbid(unsafe_code)]

pub mod hmac;
pub mod keccak;
pub mod secp256k1;
