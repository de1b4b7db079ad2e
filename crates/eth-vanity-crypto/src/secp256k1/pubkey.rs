//! Public key generation (P = k*G) and SEC1 point encodings.
//!
//! Compressed:   [0x02 | 0x03][x (32 bytes)]     prefix by parity of y
//! Uncompressed: [0x04][x (32 bytes)][y (32 bytes)]
//!
//! Coordinates are big-endian and left-padded with zeros so the value sits
//! at the least-significant end of its field.

#![forbid(unsafe_code)]

use super::scalar::Scalar;
use eth_vanity_core::{Error, Result};
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::{AffinePoint, EncodedPoint, ProjectivePoint};

/// Width of one affine coordinate.
pub const COORDINATE_LEN: usize = 32;

/// Compressed SEC1 length: header + x.
pub const COMPRESSED_LEN: usize = 33;

/// Uncompressed SEC1 length: header + x + y.
pub const UNCOMPRESSED_LEN: usize = 65;

const TAG_EVEN: u8 = 0x02;
const TAG_ODD: u8 = 0x03;
const TAG_UNCOMPRESSED: u8 = 0x04;

/// Affine coordinates of k*G, big-endian.
/// Returns None if k is zero.
pub fn mul_generator(k: &Scalar) -> Option<([u8; 32], [u8; 32])> {
    if k.is_zero() {
        return None;
    }

    let affine = (ProjectivePoint::GENERATOR * k.as_k256()).to_affine();
    let encoded = affine.to_encoded_point(false);

    let mut x = [0u8; COORDINATE_LEN];
    let mut y = [0u8; COORDINATE_LEN];
    x.copy_from_slice(encoded.x()?);
    y.copy_from_slice(encoded.y()?);
    Some((x, y))
}

/// Encode (x, y) as a 33-byte compressed key.
///
/// `x` and `y` are big-endian magnitudes of any width; leading zero bytes
/// are ignored. More than 32 significant bytes is `InvalidPoint`.
pub fn compress(x: &[u8], y: &[u8]) -> Result<[u8; COMPRESSED_LEN]> {
    let x = pad_coordinate(x)?;
    let y = pad_coordinate(y)?;
    Ok(encode_compressed(&x, &y))
}

/// Encode (x, y) as a 65-byte uncompressed key.
pub fn uncompress(x: &[u8], y: &[u8]) -> Result<[u8; UNCOMPRESSED_LEN]> {
    let x = pad_coordinate(x)?;
    let y = pad_coordinate(y)?;
    Ok(encode_uncompressed(&x, &y))
}

/// Recover the uncompressed encoding from a compressed one.
///
/// Solves the curve equation for y and picks the root whose parity matches
/// the header byte.
pub fn decompress(compressed: &[u8; COMPRESSED_LEN]) -> Result<[u8; UNCOMPRESSED_LEN]> {
    if compressed[0] != TAG_EVEN && compressed[0] != TAG_ODD {
        return Err(Error::InvalidPoint(format!(
            "unexpected compressed header 0x{:02x}",
            compressed[0]
        )));
    }

    let encoded =
        EncodedPoint::from_bytes(compressed).map_err(|e| Error::InvalidPoint(e.to_string()))?;
    let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
        .ok_or_else(|| Error::InvalidPoint("x is not on the curve".to_string()))?;

    let mut out = [0u8; UNCOMPRESSED_LEN];
    out.copy_from_slice(affine.to_encoded_point(false).as_bytes());
    Ok(out)
}

fn encode_compressed(x: &[u8; 32], y: &[u8; 32]) -> [u8; COMPRESSED_LEN] {
    let mut out = [0u8; COMPRESSED_LEN];
    out[0] = if y[31] & 1 == 1 { TAG_ODD } else { TAG_EVEN };
    out[1..].copy_from_slice(x);
    out
}

fn encode_uncompressed(x: &[u8; 32], y: &[u8; 32]) -> [u8; UNCOMPRESSED_LEN] {
    let mut out = [0u8; UNCOMPRESSED_LEN];
    out[0] = TAG_UNCOMPRESSED;
    out[1..33].copy_from_slice(x);
    out[33..65].copy_from_slice(y);
    out
}

/// Left-pad a big-endian value to exactly 32 bytes. Never truncates.
fn pad_coordinate(value: &[u8]) -> Result<[u8; COORDINATE_LEN]> {
    let start = value.iter().position(|&b| b != 0).unwrap_or(value.len());
    let significant = &value[start..];
    if significant.len() > COORDINATE_LEN {
        return Err(Error::InvalidPoint(format!(
            "coordinate has {} significant bytes, at most {} allowed",
            significant.len(),
            COORDINATE_LEN
        )));
    }

    let mut out = [0u8; COORDINATE_LEN];
    out[COORDINATE_LEN - significant.len()..].copy_from_slice(significant);
    Ok(out)
}

/// Public point of a private key, in affine coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    x: [u8; 32],
    y: [u8; 32],
}

impl PublicKey {
    /// Generate public key from private key (scalar).
    /// Returns None if private key is zero.
    pub fn from_private_key(private_key: &Scalar) -> Option<Self> {
        let (x, y) = mul_generator(private_key)?;
        Some(Self { x, y })
    }

    /// 33-byte compressed encoding.
    pub fn compressed(&self) -> [u8; COMPRESSED_LEN] {
        encode_compressed(&self.x, &self.y)
    }

    /// 65-byte uncompressed encoding.
    pub fn uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        encode_uncompressed(&self.x, &self.y)
    }

    pub fn x(&self) -> &[u8; 32] {
        &self.x
    }

    pub fn y(&self) -> &[u8; 32] {
        &self.y
    }
}
