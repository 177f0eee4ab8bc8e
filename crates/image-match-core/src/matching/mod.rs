//! Ranking stored descriptors against a query.

pub mod topk;

pub use topk::TopKSelector;

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// How many matches to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchLimit {
    /// Every stored record, sorted
    All,
    /// At most this many records
    Count(usize),
}

impl MatchLimit {
    /// Concrete K for a candidate set of `candidates` records.
    pub fn resolve(self, candidates: usize) -> usize {
        match self {
            MatchLimit::All => candidates,
            MatchLimit::Count(n) => n,
        }
    }
}

impl Default for MatchLimit {
    fn default() -> Self {
        MatchLimit::Count(10)
    }
}

impl TryFrom<i64> for MatchLimit {
    type Error = ConfigError;

    /// `-1` means all records; other negatives are rejected.
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(MatchLimit::All),
            n if n >= 0 => Ok(MatchLimit::Count(n as usize)),
            n => Err(ConfigError::ValidationError(format!(
                "number of matches must be >= 0 or -1 for all, got {n}"
            ))),
        }
    }
}

impl FromStr for MatchLimit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<i64>().map_err(|_| {
            ConfigError::ValidationError(format!("'{s}' is not a valid number of matches"))
        })?;
        Self::try_from(value)
    }
}

impl fmt::Display for MatchLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchLimit::All => write!(f, "-1"),
            MatchLimit::Count(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_from_int() {
        assert_eq!(MatchLimit::try_from(-1).unwrap(), MatchLimit::All);
        assert_eq!(MatchLimit::try_from(0).unwrap(), MatchLimit::Count(0));
        assert_eq!(MatchLimit::try_from(25).unwrap(), MatchLimit::Count(25));
        assert!(MatchLimit::try_from(-2).is_err());
    }

    #[test]
    fn test_limit_parse() {
        assert_eq!("-1".parse::<MatchLimit>().unwrap(), MatchLimit::All);
        assert_eq!("7".parse::<MatchLimit>().unwrap(), MatchLimit::Count(7));
        assert!("many".parse::<MatchLimit>().is_err());
    }

    #[test]
    fn test_resolve() {
        assert_eq!(MatchLimit::All.resolve(42), 42);
        assert_eq!(MatchLimit::Count(5).resolve(42), 5);
        assert_eq!(MatchLimit::default(), MatchLimit::Count(10));
    }
}
