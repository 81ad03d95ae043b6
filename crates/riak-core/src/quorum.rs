//! Replica quorum values (R, W, PR, PW, DW)

use serde::{Deserialize, Serialize};

/// Quorum parameter for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quorum {
    /// A single replica
    One,
    /// A majority of replicas
    Quorum,
    /// Every replica
    All,
    /// The bucket's configured value
    Default,
    /// An explicit replica count
    Count(u32),
}

impl Quorum {
    const ONE: u32 = u32::MAX - 1;
    const QUORUM: u32 = u32::MAX - 2;
    const ALL: u32 = u32::MAX - 3;
    const DEFAULT: u32 = u32::MAX - 4;

    /// Wire representation understood by the server
    pub fn to_wire(self) -> u32 {
        match self {
            Self::One => Self::ONE,
            Self::Quorum => Self::QUORUM,
            Self::All => Self::ALL,
            Self::Default => Self::DEFAULT,
            Self::Count(n) => n,
        }
    }

    /// Parse the wire representation
    pub fn from_wire(value: u32) -> Self {
        match value {
            Self::ONE => Self::One,
            Self::QUORUM => Self::Quorum,
            Self::ALL => Self::All,
            Self::DEFAULT => Self::Default,
            n => Self::Count(n),
        }
    }
}
