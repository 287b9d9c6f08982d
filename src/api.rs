//! Emergency API client
//!
//! Talks to the two server endpoints the coordinator uses. Every failure is
//! returned as a [`CoordinatorError`]; deciding whether to fall back is the
//! caller's job.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::CoordinatorError;
use crate::fallback::FallbackRecord;
use crate::hazard::HazardType;
use crate::render::Instructions;

pub const ALERT_PATH: &str = "/api/alert";
pub const INSTRUCTIONS_PATH: &str = "/api/emergency/instructions";

/// Request body shared by both endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyRequest {
    #[serde(rename = "type")]
    pub hazard: HazardType,
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
struct InstructionsEnvelope {
    instructions: Instructions,
}

pub struct EmergencyApiClient {
    base_url: String,
    http_client: Client,
}

impl EmergencyApiClient {
    /// Create a client for the server at `base_url` with a per-request timeout
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, CoordinatorError> {
        let http_client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| CoordinatorError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/alert`; the response must be a record-shaped object
    pub async fn request_alert(
        &self,
        hazard: HazardType,
        location: &str,
        dispatch_id: Uuid,
    ) -> Result<FallbackRecord, CoordinatorError> {
        info!("Requesting {} alert from server", hazard);
        let body = self.post(ALERT_PATH, hazard, location, dispatch_id).await?;
        let record: FallbackRecord = serde_json::from_str(&body)?;
        debug!("Alert response carried {} steps", record.steps.len());
        Ok(record)
    }

    /// `POST /api/emergency/instructions`
    pub async fn request_instructions(
        &self,
        hazard: HazardType,
        location: &str,
        dispatch_id: Uuid,
    ) -> Result<Instructions, CoordinatorError> {
        info!("Requesting {} instructions from server", hazard);
        let body = self.post(INSTRUCTIONS_PATH, hazard, location, dispatch_id).await?;
        let envelope: InstructionsEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.instructions)
    }

    async fn post(
        &self,
        path: &str,
        hazard: HazardType,
        location: &str,
        dispatch_id: Uuid,
    ) -> Result<String, CoordinatorError> {
        let url = format!("{}{}", self.base_url, path);
        let request = EmergencyRequest {
            hazard,
            location: location.to_string(),
        };

        let response = self
            .http_client
            .post(&url)
            .header("x-request-id", dispatch_id.to_string())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoordinatorError::HttpStatus(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}
