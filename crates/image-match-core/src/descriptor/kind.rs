//! Descriptor bin-count variants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

/// Total number of bins of a Color Structure Descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub enum DescriptorKind {
    Bin32,
    Bin64,
    Bin128,
    Bin256,
}

impl DescriptorKind {
    /// Every supported kind, smallest first.
    pub const ALL: [DescriptorKind; 4] = [
        DescriptorKind::Bin32,
        DescriptorKind::Bin64,
        DescriptorKind::Bin128,
        DescriptorKind::Bin256,
    ];

    /// Number of bins, which is also the descriptor length.
    pub fn bins(self) -> usize {
        self.as_u16() as usize
    }

    pub fn as_u16(self) -> u16 {
        match self {
            DescriptorKind::Bin32 => 32,
            DescriptorKind::Bin64 => 64,
            DescriptorKind::Bin128 => 128,
            DescriptorKind::Bin256 => 256,
        }
    }
}

impl TryFrom<i64> for DescriptorKind {
    type Error = DescriptorError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            32 => Ok(DescriptorKind::Bin32),
            64 => Ok(DescriptorKind::Bin64),
            128 => Ok(DescriptorKind::Bin128),
            256 => Ok(DescriptorKind::Bin256),
            other => Err(DescriptorError::InvalidKind(other)),
        }
    }
}

impl From<DescriptorKind> for u16 {
    fn from(kind: DescriptorKind) -> Self {
        kind.as_u16()
    }
}

impl FromStr for DescriptorKind {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Non-numeric input reports as an out-of-range kind.
        let value = s.trim().parse::<i64>().unwrap_or(-1);
        Self::try_from(value)
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_kinds() {
        for kind in DescriptorKind::ALL {
            let value = kind.as_u16() as i64;
            assert_eq!(DescriptorKind::try_from(value).unwrap(), kind);
            assert_eq!(kind.bins(), value as usize);
        }
    }

    #[test]
    fn test_invalid_kinds_rejected() {
        for value in [0, 1, 16, 31, 33, 100, 512, -32] {
            assert_eq!(
                DescriptorKind::try_from(value),
                Err(DescriptorError::InvalidKind(value))
            );
        }
    }

    #[test]
    fn test_parse_from_str() {
        assert_eq!("128".parse::<DescriptorKind>(), Ok(DescriptorKind::Bin128));
        assert!("abc".parse::<DescriptorKind>().is_err());
        assert!("48".parse::<DescriptorKind>().is_err());
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&DescriptorKind::Bin64).unwrap();
        assert_eq!(json, "64");
        let kind: DescriptorKind = serde_json::from_str("256").unwrap();
        assert_eq!(kind, DescriptorKind::Bin256);
        assert!(serde_json::from_str::<DescriptorKind>("100").is_err());
    }
}
