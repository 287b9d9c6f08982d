//! Offline safety content
//!
//! The dataset maps every [`HazardType`] to exactly one [`FallbackRecord`].
//! It is built once (either the built-in table or a YAML file) and never
//! mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::CoordinatorError;
use crate::hazard::HazardType;

/// Safety content for one hazard. Also the shape of a successful `/api/alert` response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FallbackRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub sms_template: String,
}

impl FallbackRecord {
    fn new(title: &str, summary: &str, steps: &[&str], sms_template: &str) -> Self {
        Self {
            title: title.to_string(),
            summary: summary.to_string(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
            sms_template: sms_template.to_string(),
        }
    }

    /// Record rendered when a hazard has no entry in the dataset
    pub fn generic() -> Self {
        Self::new(
            "Emergency",
            "Safety guidance for this emergency is unavailable. Follow instructions from local authorities.",
            &[
                "Move away from immediate danger",
                "Call emergency services",
                "Follow instructions from local authorities",
            ],
            "EMERGENCY! I'm at [LOCATION]. Need assistance!",
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackDataset {
    records: BTreeMap<HazardType, FallbackRecord>,
}

impl FallbackDataset {
    /// The built-in table shipped with the coordinator
    pub fn builtin() -> Self {
        let mut records = BTreeMap::new();

        records.insert(
            HazardType::Earthquake,
            FallbackRecord::new(
                "Earthquake Safety",
                "If you're indoors during an earthquake, stay there. Move away from windows and heavy furniture.",
                &[
                    "Drop to your hands and knees",
                    "Cover your head and neck with your arms",
                    "Hold on to sturdy furniture",
                    "If in bed, cover head with a pillow",
                    "Stay indoors until the shaking stops",
                ],
                "EARTHQUAKE ALERT! I'm at [LOCATION]. The building is shaking. Need immediate assistance!",
            ),
        );
        records.insert(
            HazardType::Fire,
            FallbackRecord::new(
                "Fire Emergency",
                "Stay low and escape quickly.",
                &[
                    "Crawl low under smoke",
                    "Check door temperature first",
                    "Use alternative exits if needed",
                    "Go to meeting point",
                    "Call emergency services",
                ],
                "FIRE ALERT! Fire at [LOCATION]. Need immediate assistance!",
            ),
        );
        records.insert(
            HazardType::Flood,
            FallbackRecord::new(
                "Flood Safety",
                "Move to higher ground immediately.",
                &[
                    "Move to higher ground",
                    "Avoid walking in moving water",
                    "Never drive into floodwaters",
                    "Avoid downed power lines",
                    "Follow evacuation orders",
                ],
                "FLOOD ALERT! Trapped at [LOCATION]. Water rising. Need help!",
            ),
        );
        records.insert(
            HazardType::Tsunami,
            FallbackRecord::new(
                "Tsunami Warning",
                "If a strong quake occurs near the coast, move to higher ground immediately.",
                &[
                    "Go to higher ground immediately",
                    "Follow evacuation signs",
                    "Do NOT go to shore",
                    "Stay away until official all-clear",
                    "Monitor alerts",
                ],
                "TSUNAMI WARNING! At [LOCATION]. Moving to high ground.",
            ),
        );
        records.insert(
            HazardType::General,
            FallbackRecord::new(
                "General Emergency",
                "Stay calm, get to a safe place and contact emergency services.",
                &[
                    "Move away from immediate danger",
                    "Call emergency services",
                    "Check yourself and others for injuries",
                    "Keep your phone charged and conserve battery",
                    "Follow instructions from local authorities",
                ],
                "EMERGENCY! I'm at [LOCATION]. Need immediate assistance!",
            ),
        );

        Self { records }
    }

    /// Build a dataset from explicit records, requiring one per hazard.
    pub fn from_records(
        records: BTreeMap<HazardType, FallbackRecord>,
    ) -> Result<Self, CoordinatorError> {
        let missing: Vec<&str> = HazardType::ALL
            .iter()
            .filter(|hazard| !records.contains_key(hazard))
            .map(|hazard| hazard.as_str())
            .collect();

        if !missing.is_empty() {
            return Err(CoordinatorError::ConfigError(format!(
                "Fallback dataset is missing records for: {}",
                missing.join(", ")
            )));
        }

        for (hazard, record) in &records {
            if record.steps.is_empty() {
                warn!("Fallback record for {} has no steps", hazard);
            }
        }

        Ok(Self { records })
    }

    /// Load a dataset from a YAML file keyed by hazard name
    pub fn load_from_file(path: &Path) -> Result<Self, CoordinatorError> {
        info!("Loading fallback dataset from: {:?}", path);

        let contents = fs::read_to_string(path).map_err(|e| {
            CoordinatorError::ConfigError(format!("Failed to read {:?}: {}", path, e))
        })?;

        let records: BTreeMap<HazardType, FallbackRecord> = serde_yaml::from_str(&contents)
            .map_err(|e| {
                CoordinatorError::ConfigError(format!("Failed to parse {:?}: {}", path, e))
            })?;

        Self::from_records(records)
    }

    pub fn get(&self, hazard: HazardType) -> Option<&FallbackRecord> {
        self.records.get(&hazard)
    }

    /// Record for `hazard`, or the generic record when absent
    pub fn record_or_generic(&self, hazard: HazardType) -> FallbackRecord {
        match self.get(hazard) {
            Some(record) => record.clone(),
            None => {
                warn!("No fallback record for {}, using generic guidance", hazard);
                FallbackRecord::generic()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for FallbackDataset {
    fn default() -> Self {
        Self::builtin()
    }
}
