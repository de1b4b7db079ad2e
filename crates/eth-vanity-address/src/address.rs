//! Raw 20-byte addresses.
//!
//! address = keccak256(uncompressed_pubkey[1..65])[12..32]

#![forbid(unsafe_code)]

use eth_vanity_crypto::keccak::keccak256;
use eth_vanity_crypto::secp256k1::pubkey::UNCOMPRESSED_LEN;

/// Address length in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Derive the address of an uncompressed (0x04-prefixed) public key.
///
/// The header byte is not hashed.
pub fn address_from_public_key(public_key: &[u8; UNCOMPRESSED_LEN]) -> [u8; ADDRESS_LEN] {
    let hash = keccak256(&public_key[1..]);
    let mut address = [0u8; ADDRESS_LEN];
    address.copy_from_slice(&hash[32 - ADDRESS_LEN..]);
    address
}

#[cfg(test)]
mod tests {
    use super::*;
    use eth_vanity_crypto::secp256k1::pubkey::{decompress, PublicKey};
    use eth_vanity_crypto::secp256k1::scalar::Scalar;

    #[test]
    fn test_generator_address() {
        // Private key 1
        let pubkey = PublicKey::from_private_key(&Scalar::ONE).unwrap();
        assert_eq!(
            hex::encode(address_from_public_key(&pubkey.uncompressed())),
            "7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_known_public_key() {
        // repeat x 11 + rescue, m/44'/60'/0'/0/0
        let mut compressed = [0u8; 33];
        compressed.copy_from_slice(
            &hex::decode("036b8387ad386664bb70e326a07a87ae179fbb32705a3c46635bbdd618fa11984f")
                .unwrap(),
        );
        let uncompressed = decompress(&compressed).unwrap();
        assert_eq!(
            hex::encode(address_from_public_key(&uncompressed)),
            "114a781017506df34b3ed4c0e6b438889a6eb3f7"
        );
    }

    #[test]
    fn test_header_byte_not_hashed() {
        let pubkey = PublicKey::from_private_key(&Scalar::ONE).unwrap();
        let mut tweaked = pubkey.uncompressed();
        tweaked[0] = 0x00;
        assert_eq!(
            address_from_public_key(&tweaked),
            address_from_public_key(&pubkey.uncompressed())
        );
    }
}
