//! Hazard categories handled by the coordinator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoordinatorError;

/// Category of emergency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardType {
    Earthquake,
    Fire,
    Flood,
    Tsunami,
    General,
}

impl HazardType {
    pub const ALL: [HazardType; 5] = [
        HazardType::Earthquake,
        HazardType::Fire,
        HazardType::Flood,
        HazardType::Tsunami,
        HazardType::General,
    ];

    /// Wire name, as sent in the `type` field of API requests
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardType::Earthquake => "earthquake",
            HazardType::Fire => "fire",
            HazardType::Flood => "flood",
            HazardType::Tsunami => "tsunami",
            HazardType::General => "general",
        }
    }

    /// Capitalized name used in headings
    pub fn display_name(&self) -> &'static str {
        match self {
            HazardType::Earthquake => "Earthquake",
            HazardType::Fire => "Fire",
            HazardType::Flood => "Flood",
            HazardType::Tsunami => "Tsunami",
            HazardType::General => "General",
        }
    }

    /// Title shown when a record carries no title of its own
    pub fn default_title(&self) -> String {
        format!("{} Emergency", self.display_name())
    }

    /// Pick the hazard a page is about from its path.
    ///
    /// Matching is case-sensitive. Keywords are checked in a fixed order
    /// and the last match wins, so
    /// `/fire/after-earthquake` resolves to fire. Paths without a keyword
    /// resolve to [`HazardType::General`].
    pub fn from_page_path(path: &str) -> Self {
        let mut hazard = HazardType::General;
        for candidate in [
            HazardType::Earthquake,
            HazardType::Fire,
            HazardType::Flood,
            HazardType::Tsunami,
        ] {
            if path.contains(candidate.as_str()) {
                hazard = candidate;
            }
        }
        hazard
    }
}

impl fmt::Display for HazardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HazardType {
    type Err = CoordinatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HazardType::ALL
            .into_iter()
            .find(|hazard| hazard.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoordinatorError::ConfigError(format!("Unknown hazard type: {}", s)))
    }
}
