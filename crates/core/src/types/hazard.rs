//! Hazard classification for catalog products.

use serde::{Deserialize, Serialize};

/// Ordinal classification of a product's disposal risk.
///
/// Data files occasionally carry values outside the four known levels. Those
/// load as [`HazardLevel::Unclassified`] instead of failing the whole catalog,
/// and sort below every known level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HazardLevel {
    Low,
    Medium,
    High,
    Critical,
    #[default]
    #[serde(other)]
    Unclassified,
}

impl HazardLevel {
    /// The four recognised levels in ordinal order (selector options).
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Wire/selector value for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
            Self::Unclassified => "unclassified",
        }
    }

    /// Position on the risk scale; unclassified is lowest.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Unclassified => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
            Self::Unclassified => "Unclassified",
        }
    }
}

impl Ord for HazardLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for HazardLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for HazardLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HazardLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("invalid hazard level: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_follows_risk() {
        assert!(HazardLevel::Unclassified < HazardLevel::Low);
        assert!(HazardLevel::Low < HazardLevel::Medium);
        assert!(HazardLevel::Medium < HazardLevel::High);
        assert!(HazardLevel::High < HazardLevel::Critical);
        assert_eq!(HazardLevel::ALL.iter().max(), Some(&HazardLevel::Critical));
    }

    #[test]
    fn test_unknown_value_deserializes_as_unclassified() {
        let level: HazardLevel = serde_json::from_str("\"radioactive\"").unwrap();
        assert_eq!(level, HazardLevel::Unclassified);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!("critical".parse::<HazardLevel>(), Ok(HazardLevel::Critical));
        assert!("extreme".parse::<HazardLevel>().is_err());
    }

    #[test]
    fn test_all_excludes_unclassified() {
        assert!(!HazardLevel::ALL.contains(&HazardLevel::Unclassified));
    }
}
