//! One derived Ethereum account.
//!
//! Full pipeline: seed → master key → derived key → pubkey → address → checksum

#![forbid(unsafe_code)]

use eth_vanity_address::{address_from_public_key, to_checksum, ADDRESS_LEN};
use eth_vanity_bip::bip32::{self, ExtendedPrivateKey};
use eth_vanity_bip::{DerivationPath, RootSecret};
use eth_vanity_core::Result;
use eth_vanity_crypto::secp256k1::pubkey::{COMPRESSED_LEN, UNCOMPRESSED_LEN};
use std::fmt;

/// BIP39 passphrase used for every stored account.
pub const PASSPHRASE: &str = "";

/// Key material and address at one derivation path.
///
/// A pure function of (seed, path); immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedAccount {
    /// Raw 32-byte private scalar
    pub private_key: [u8; 32],
    /// SEC1 compressed public key
    pub public_key_compressed: [u8; COMPRESSED_LEN],
    /// SEC1 uncompressed public key
    pub public_key_uncompressed: [u8; UNCOMPRESSED_LEN],
    /// keccak256(pubkey)[12..]
    pub address: [u8; ADDRESS_LEN],
    /// EIP-55 rendering of `address`, `0x` prefixed
    pub address_checksummed: String,
}

impl DerivedAccount {
    /// Format an already-derived key.
    pub fn from_key(key: &ExtendedPrivateKey) -> Result<Self> {
        let public_key = key.public_key()?;
        let public_key_uncompressed = public_key.uncompressed();
        let address = address_from_public_key(&public_key_uncompressed);

        Ok(Self {
            private_key: key.private_key(),
            public_key_compressed: public_key.compressed(),
            public_key_uncompressed,
            address,
            address_checksummed: to_checksum(&address, None),
        })
    }

    /// Derive the account at `path` below the master key of `seed`.
    pub fn derive(seed: &[u8], path: &DerivationPath) -> Result<Self> {
        Self::from_key(&bip32::derive(seed, path)?)
    }

    /// Derive the account at `path` for `secret` under [`PASSPHRASE`].
    pub fn from_secret(secret: &RootSecret, path: &DerivationPath) -> Result<Self> {
        Self::derive(&secret.seed(PASSPHRASE), path)
    }

    /// `0x` + 64 hex digits; leading zero bytes are kept.
    pub fn private_key_hex(&self) -> String {
        prefixed_hex(&self.private_key)
    }

    /// `0x` + compressed public key hex.
    pub fn public_key_hex(&self) -> String {
        prefixed_hex(&self.public_key_compressed)
    }

    /// `0x` + lower-case address hex.
    pub fn address_hex(&self) -> String {
        prefixed_hex(&self.address)
    }
}

impl fmt::Debug for DerivedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedAccount")
            .field("address", &self.address_checksummed)
            .field("public_key", &self.public_key_hex())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

pub(crate) fn prefixed_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eth_vanity_bip::bip39::mnemonic_to_seed;

    const REPEAT: &str =
        "repeat repeat repeat repeat repeat repeat repeat repeat repeat repeat repeat rescue";

    fn account(path: &str) -> DerivedAccount {
        let seed = mnemonic_to_seed(REPEAT, "").unwrap();
        DerivedAccount::derive(&seed, &path.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_reference_vectors() {
        // (path, private key, compressed public key, address)
        let cases = [
            (
                "m/44'/60'/0'/0/0",
                "0x6f210f99b79bd5d2d4d93c061aae0351aa00b2b9f1e5f43ffac58ac4a983d355",
                "0x036b8387ad386664bb70e326a07a87ae179fbb32705a3c46635bbdd618fa11984f",
                "0x114A781017506df34B3Ed4C0E6B438889a6Eb3F7",
            ),
            (
                "m/44'/60'/0'/0/1",
                "0x799647d70bb0cbd6fff050defe6299c27771b27362679ded72ec022cdcc0e359",
                "0x02b6a746c1eeb764e90dec1952a8ea46c24a9101cf1565c663a128aabe5295e512",
                "0x3d2F2242a7B705E7865c38a68989A7cde6b6f8Ad",
            ),
            (
                "m/44'/60'/0'/0/2",
                "0xceb005d73b46cdc964993d981e9980378770319a8bdd391f9722d22cf162a111",
                "0x03b408ca61d93f997156951851aecb997d57869579263d1e9c3c089ecba0c8ca4a",
                "0x4031B9cd5728d9cc26C0819747C00ECaA06d1cbB",
            ),
        ];

        for (path, private_key, public_key, address) in cases {
            let acc = account(path);
            assert_eq!(acc.private_key_hex(), private_key, "private key at {path}");
            assert_eq!(acc.public_key_hex(), public_key, "public key at {path}");
            assert_eq!(acc.address_checksummed, address, "address at {path}");
        }
    }

    #[test]
    fn test_fields_consistent() {
        let acc = account("m/44'/60'/0'/0/0");
        assert_eq!(acc.public_key_uncompressed[0], 0x04);
        assert_eq!(&acc.public_key_compressed[1..], &acc.public_key_uncompressed[1..33]);
        assert_eq!(acc.address_hex(), acc.address_checksummed.to_ascii_lowercase());
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(account("m/44'/60'/0'/0/0"), account("m/44'/60'/0'/0/0"));
        assert_ne!(account("m/44'/60'/0'/0/0"), account("m/44'/60'/0'/0/1"));
    }

    #[test]
    fn test_from_secret_matches_seed_path() {
        let secret = RootSecret::from_mnemonic(REPEAT).unwrap();
        let path: DerivationPath = "m/44'/60'/0'/0/2".parse().unwrap();
        assert_eq!(
            DerivedAccount::from_secret(&secret, &path).unwrap(),
            account("m/44'/60'/0'/0/2")
        );
    }

    #[test]
    fn test_root_account() {
        // Root path formats the master key itself
        let seed = mnemonic_to_seed(REPEAT, "").unwrap();
        let master = ExtendedPrivateKey::from_seed(&seed).unwrap();
        assert_eq!(account("m"), DerivedAccount::from_key(&master).unwrap());
    }

    #[test]
    fn test_private_key_hex_fixed_width() {
        let mut acc = account("m/44'/60'/0'/0/0");
        acc.private_key = [0u8; 32];
        acc.private_key[31] = 0x01;
        assert_eq!(acc.private_key_hex().len(), 66);
        assert!(acc.private_key_hex().starts_with("0x0000"));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let acc = account("m/44'/60'/0'/0/0");
        let debug_str = format!("{:?}", acc);
        assert!(debug_str.contains("0x114A781017506df34B3Ed4C0E6B438889a6Eb3F7"));
        assert!(debug_str.contains("<redacted>"));
        assert!(!debug_str.contains("6f210f99"));
    }
}
