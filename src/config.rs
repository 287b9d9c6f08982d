use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::CoordinatorError;
use crate::location::PositionOptions;

/// Prefix of environment variables overriding configuration, e.g. `AIDGEN_SERVER_URL`
pub const ENV_PREFIX: &str = "AIDGEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    pub server_url: String,
    /// Upper bound on waiting for a device position
    pub location_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub high_accuracy: bool,
    pub maximum_age_ms: u64,
    /// How long the copy button shows its confirmation
    pub copy_feedback_ms: u64,
    pub location_warning_ms: u64,
    pub instructions_error_ms: u64,
    /// YAML file replacing the built-in fallback dataset
    pub fallback_dataset_path: Option<PathBuf>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            location_timeout_ms: 15_000,
            request_timeout_ms: 10_000,
            high_accuracy: true,
            maximum_age_ms: 0,
            copy_feedback_ms: 1_500,
            location_warning_ms: 3_000,
            instructions_error_ms: 4_000,
            fallback_dataset_path: None,
        }
    }
}

impl CoordinatorConfig {
    /// Load defaults, then the optional file, then `AIDGEN_*` environment variables
    pub fn load(file: Option<&Path>) -> Result<Self, CoordinatorError> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("server_url", defaults.server_url.clone())
            .and_then(|b| b.set_default("location_timeout_ms", defaults.location_timeout_ms))
            .and_then(|b| b.set_default("request_timeout_ms", defaults.request_timeout_ms))
            .and_then(|b| b.set_default("high_accuracy", defaults.high_accuracy))
            .and_then(|b| b.set_default("maximum_age_ms", defaults.maximum_age_ms))
            .and_then(|b| b.set_default("copy_feedback_ms", defaults.copy_feedback_ms))
            .and_then(|b| b.set_default("location_warning_ms", defaults.location_warning_ms))
            .and_then(|b| b.set_default("instructions_error_ms", defaults.instructions_error_ms))
            .map_err(|e| CoordinatorError::ConfigError(format!("Invalid default: {}", e)))?;

        if let Some(path) = file {
            info!("Loading configuration from: {:?}", path);
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let loaded: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CoordinatorError::ConfigError(format!("Failed to load configuration: {}", e)))?;

        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), CoordinatorError> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(CoordinatorError::ConfigError(format!(
                "server_url must be an http(s) URL, got {}",
                self.server_url
            )));
        }

        for (name, value) in [
            ("location_timeout_ms", self.location_timeout_ms),
            ("request_timeout_ms", self.request_timeout_ms),
            ("copy_feedback_ms", self.copy_feedback_ms),
        ] {
            if value == 0 {
                return Err(CoordinatorError::ConfigError(format!("{} must be greater than zero", name)));
            }
        }

        Ok(())
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_millis(self.location_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }

    pub fn location_warning(&self) -> Duration {
        Duration::from_millis(self.location_warning_ms)
    }

    pub fn instructions_error(&self) -> Duration {
        Duration::from_millis(self.instructions_error_ms)
    }

    /// Options for the device query; the device timeout matches the hard race bound
    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            enable_high_accuracy: self.high_accuracy,
            timeout: self.location_timeout(),
            maximum_age: Duration::from_millis(self.maximum_age_ms),
        }
    }
}
