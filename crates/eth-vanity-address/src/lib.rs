//! Ethereum address encoding.

#![forbid(unsafe_code)]

pub mod address;
pub mod chain;
pub mod checksum;

pub use address::{address_from_public_key, ADDRESS_LEN};
pub use chain::ChainId;
pub use checksum::{checksum_address, is_checksum_valid, to_checksum};
