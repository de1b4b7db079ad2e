//! Scalar arithmetic modulo the curve order n.
//!
//! n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
//! Private keys live here; BIP-32 child derivation needs add mod n.

#![forbid(unsafe_code)]

use k256::elliptic_curve::ff::PrimeField;
use k256::FieldBytes;

/// Element of Z/nZ.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Scalar(k256::Scalar);

impl Scalar {
    pub const ZERO: Self = Self(k256::Scalar::ZERO);

    pub const ONE: Self = Self(k256::Scalar::ONE);

    /// Parse a big-endian scalar.
    /// Returns None if value >= n.
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        Option::<k256::Scalar>::from(k256::Scalar::from_repr(FieldBytes::from(*bytes))).map(Self)
    }

    /// Big-endian encoding, always 32 bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    pub fn is_zero(&self) -> bool {
        bool::from(self.0.is_zero())
    }

    /// (self + other) mod n
    pub fn add(&self, other: &Self) -> Self {
        Self(self.0 + other.0)
    }

    pub(crate) fn as_k256(&self) -> &k256::Scalar {
        &self.0
    }
}

impl std::fmt::Debug for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Scalar(<redacted>)")
    }
}
