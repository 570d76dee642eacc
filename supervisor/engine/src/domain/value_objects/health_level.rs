//! Health level value object
//! Tri-state cluster health reported by the search engine

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Cluster health, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Red,
    Yellow,
    Green,
}

impl HealthLevel {
    /// Lowest level at which the process is considered able to serve.
    pub const MIN_OPERATIONAL: HealthLevel = HealthLevel::Yellow;

    pub fn is_operational(self) -> bool {
        self >= Self::MIN_OPERATIONAL
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Self::Red => 1,
            Self::Yellow => 2,
            Self::Green => 3,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Red),
            2 => Some(Self::Yellow),
            3 => Some(Self::Green),
            _ => None,
        }
    }
}

impl std::fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Yellow => write!(f, "yellow"),
            Self::Green => write!(f, "green"),
        }
    }
}

impl FromStr for HealthLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "yellow" => Ok(Self::Yellow),
            "green" => Ok(Self::Green),
            other => Err(format!("unknown health level: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered_worst_to_best() {
        assert!(HealthLevel::Red < HealthLevel::Yellow);
        assert!(HealthLevel::Yellow < HealthLevel::Green);
    }

    #[test]
    fn test_only_red_is_not_operational() {
        assert!(!HealthLevel::Red.is_operational());
        assert!(HealthLevel::Yellow.is_operational());
        assert!(HealthLevel::Green.is_operational());
    }

    #[test]
    fn test_u8_encoding_reserves_zero_for_unknown() {
        assert_eq!(HealthLevel::from_u8(0), None);
        for level in [HealthLevel::Red, HealthLevel::Yellow, HealthLevel::Green] {
            assert_eq!(HealthLevel::from_u8(level.to_u8()), Some(level));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("GREEN".parse::<HealthLevel>().unwrap(), HealthLevel::Green);
        assert!("blue".parse::<HealthLevel>().is_err());
    }
}
