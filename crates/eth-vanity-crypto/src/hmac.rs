//! HMAC-SHA512 (RFC 2104), the keyed hash behind BIP-32.

#![forbid(unsafe_code)]

use eth_vanity_core::{Error, Result};
use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Compute HMAC-SHA512 over a single message.
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> Result<[u8; 64]> {
    hmac_sha512_parts(key, &[data])
}

/// Compute HMAC-SHA512 over the concatenation of `parts`.
///
/// Avoids building a temporary buffer for BIP-32 child data
/// (`0x00 || key || index` and `pubkey || index`).
pub fn hmac_sha512_parts(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 64]> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| Error::InvalidKey(format!("HMAC key: {}", e)))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc4231_vectors() {
        let cases: &[(&[u8], &[u8], &str)] = &[
            // Test Case 1
            (
                &[0x0b; 20],
                b"Hi There",
                "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cde\
                 daa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854",
            ),
            // Test Case 2
            (
                b"Jefe",
                b"what do ya want for nothing?",
                "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
                 9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737",
            ),
            // Test Case 6, key longer than the block size
            (
                &[0xaa; 131],
                b"Test Using Larger Than Block-Size Key - Hash Key First",
                "80b24263c7c1a3ebb71493c1dd7be8b49b46d1f41b4aeec1121b013783f8f352\
                 6b56d037e05f2598bd0fd2215d6a1e5295e64f73f63f0aec8b915a985d786598",
            ),
        ];

        for (key, data, expected) in cases {
            assert_eq!(hex::encode(hmac_sha512(key, data).unwrap()), *expected);
        }
    }

    #[test]
    fn test_parts_equal_concatenation() {
        let key = b"Bitcoin seed";
        let joined = hmac_sha512(key, b"\x00abcdef\x80\x00\x00\x2c").unwrap();
        let split =
            hmac_sha512_parts(key, &[&[0x00], b"abcdef", &[0x80, 0x00, 0x00, 0x2c]]).unwrap();
        assert_eq!(joined, split);
    }

    #[test]
    fn test_no_parts_is_empty_message() {
        assert_eq!(
            hmac_sha512_parts(b"k", &[]).unwrap(),
            hmac_sha512(b"k", b"").unwrap()
        );
    }

    #[test]
    fn test_any_key_length_accepted() {
        for len in [0usize, 1, 32, 128, 129, 1024] {
            assert!(hmac_sha512(&vec![0x5c; len], b"data").is_ok());
        }
    }
}
