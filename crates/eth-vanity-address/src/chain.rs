//! Chain ids that select the EIP-1191 checksum variant.

#![forbid(unsafe_code)]

use std::fmt;

/// EIP-155 chain id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Ethereum mainnet. Wallets keep using plain EIP-55 here.
    pub const ETHEREUM: Self = Self(1);

    /// RSK mainnet, the chain EIP-1191 was written for.
    pub const RSK_MAINNET: Self = Self(30);

    /// RSK testnet
    pub const RSK_TESTNET: Self = Self(31);

    pub const fn id(self) -> u64 {
        self.0
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
