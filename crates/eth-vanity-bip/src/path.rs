//! BIP-32 derivation paths.
//!
//! Grammar: `m(/<1-10 digits>(')?)*`. The empty string and `m` are the root.
//! Ethereum accounts live under m / 44' / 60' / account' / change / address_index.

#![forbid(unsafe_code)]

use crate::bip32::HARDENED;
use eth_vanity_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// BIP-44 purpose constant.
pub const PURPOSE: u32 = 44;

/// Ethereum coin type (SLIP-0044).
pub const ETHEREUM_COIN_TYPE: u32 = 60;

/// First Ethereum account, m/44'/60'/0'/0/0.
pub const DEFAULT_PATH: &str = "m/44'/60'/0'/0/0";

/// Longest accepted run of digits in one segment.
const MAX_INDEX_DIGITS: usize = 10;

/// One level of a derivation path.
///
/// `index` is the logical child index; the hardened offset is applied by
/// [`DerivationStep::child_number`], never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DerivationStep {
    index: u32,
    hardened: bool,
}

impl DerivationStep {
    /// Create a step. Indices at or above 2^31 are rejected.
    pub fn new(index: u32, hardened: bool) -> Result<Self> {
        if index >= HARDENED {
            return Err(Error::IndexOutOfRange {
                index: u64::from(index),
            });
        }
        Ok(Self { index, hardened })
    }

    pub fn normal(index: u32) -> Result<Self> {
        Self::new(index, false)
    }

    pub fn hardened(index: u32) -> Result<Self> {
        Self::new(index, true)
    }

    /// Logical index, without the hardened offset.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// Raw BIP-32 child number: `index + 2^31` for hardened steps.
    pub fn child_number(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED
        } else {
            self.index
        }
    }
}

impl fmt::Display for DerivationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// Ordered derivation steps from the root key. Empty means the root itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    steps: Vec<DerivationStep>,
}

impl DerivationPath {
    /// The root path, `m`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a textual path.
    ///
    /// Blank input and `m` give the root. Anything not matching the grammar
    /// is `InvalidPath`; an index of 2^31 or more is `IndexOutOfRange`.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::root());
        }

        let mut segments = text.split('/');
        if segments.next() != Some("m") {
            return Err(invalid_path(text, "must start with 'm'"));
        }

        let mut steps = Vec::new();
        for segment in segments {
            let (digits, hardened) = match segment.strip_suffix('\'') {
                Some(digits) => (digits, true),
                None => (segment, false),
            };

            if digits.is_empty() || digits.len() > MAX_INDEX_DIGITS {
                return Err(invalid_path(text, "each segment needs 1 to 10 digits"));
            }
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid_path(text, "segments must be decimal digits"));
            }

            // Ten digits always fit in u64.
            let index: u64 = digits
                .parse()
                .map_err(|_| invalid_path(text, "segments must be decimal digits"))?;
            let index = u32::try_from(index)
                .ok()
                .filter(|&i| i < HARDENED)
                .ok_or(Error::IndexOutOfRange { index })?;

            steps.push(DerivationStep::new(index, hardened)?);
        }

        Ok(Self { steps })
    }

    /// m / 44' / coin_type' / account' / change / address_index
    pub fn bip44(coin_type: u32, account: u32, change: u32, address_index: u32) -> Result<Self> {
        Ok(Self {
            steps: vec![
                DerivationStep::hardened(PURPOSE)?,
                DerivationStep::hardened(coin_type)?,
                DerivationStep::hardened(account)?,
                DerivationStep::normal(change)?,
                DerivationStep::normal(address_index)?,
            ],
        })
    }

    /// m/44'/60'/0'/0/address_index
    pub fn ethereum(address_index: u32) -> Result<Self> {
        Self::bip44(ETHEREUM_COIN_TYPE, 0, 0, address_index)
    }

    /// This path extended by one step.
    pub fn child(&self, step: DerivationStep) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    pub fn steps(&self) -> &[DerivationStep] {
        &self.steps
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Depth below the root.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for step in &self.steps {
            write!(f, "/{}", step)?;
        }
        Ok(())
    }
}

fn invalid_path(text: &str, reason: &str) -> Error {
    Error::InvalidPath(format!("'{}': {}", text, reason))
}
