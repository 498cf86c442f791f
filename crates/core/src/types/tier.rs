//! Loyalty membership tiers.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Loyalty program membership tier.
///
/// Profiles created before the loyalty program have no tier on record, and
/// the identity backend may add tiers before clients know about them; both
/// cases read as [`MembershipTier::Silver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
pub enum MembershipTier {
    #[default]
    Silver,
    Gold,
    Platinum,
}

impl MembershipTier {
    /// Parse a tier name, case-insensitively. Unknown names map to the default tier.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "gold" => Self::Gold,
            "platinum" => Self::Platinum,
            _ => Self::Silver,
        }
    }

    /// Canonical display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Platinum => "Platinum",
        }
    }
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MembershipTier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or_else(Self::default, Self::parse_lenient))
    }
}
