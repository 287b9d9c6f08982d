//! Emergency Response Coordinator
//!
//! Orchestrates one emergency dispatch: acquire the location, ask the server
//! for an alert record, and fall back to the static dataset whenever the
//! server path fails. Every dispatch ends with the result panel visible.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::EmergencyApiClient;
use crate::clipboard::{Clipboard, CopyButton, MemoryClipboard};
use crate::config::CoordinatorConfig;
use crate::connectivity::ConnectivityWatch;
use crate::error::{CoordinatorError, ErrorKind};
use crate::fallback::{FallbackDataset, FallbackRecord};
use crate::hazard::HazardType;
use crate::location::{GeolocationProvider, LocationService, LocationString, UnsupportedGeolocation};
use crate::page::{Page, StatusClass};
use crate::render::{instructions_html, render_result};

/// How a dispatch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DispatchOutcome {
    /// Server record rendered
    Server,
    /// Static record rendered after a failure of the given kind
    Fallback { reason: ErrorKind },
    /// Ignored because another dispatch was still running
    Busy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchReport {
    pub id: Uuid,
    pub hazard: HazardType,
    pub location: String,
    pub outcome: DispatchOutcome,
    pub started_at: DateTime<Utc>,
}

impl DispatchReport {
    pub fn used_fallback(&self) -> bool {
        matches!(self.outcome, DispatchOutcome::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<ErrorKind> {
        match self.outcome {
            DispatchOutcome::Fallback { reason } => Some(reason),
            _ => None,
        }
    }
}

/// How an instructions fetch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionsOutcome {
    Rendered,
    Failed(ErrorKind),
}

/// Clears the in-flight flag when a dispatch finishes, however it finishes
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct EmergencyCoordinator {
    page: Page,
    dataset: FallbackDataset,
    connectivity: ConnectivityWatch,
    location: LocationService,
    api: EmergencyApiClient,
    copy_button: CopyButton,
    instructions_error: Duration,
    in_flight: AtomicBool,
}

impl EmergencyCoordinator {
    pub fn builder(config: CoordinatorConfig, connectivity: ConnectivityWatch) -> CoordinatorBuilder {
        CoordinatorBuilder {
            config,
            connectivity,
            page: None,
            dataset: None,
            geolocation: None,
            clipboard: None,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn dataset(&self) -> &FallbackDataset {
        &self.dataset
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one emergency dispatch for `hazard`.
    ///
    /// A dispatch started while another is running is ignored and reported
    /// as [`DispatchOutcome::Busy`].
    pub async fn handle_emergency(&self, hazard: HazardType) -> DispatchReport {
        let id = Uuid::new_v4();
        let started_at = Utc::now();

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            info!("Dispatch {} for {} ignored: another dispatch is in flight", id, hazard);
            return DispatchReport {
                id,
                hazard,
                location: String::new(),
                outcome: DispatchOutcome::Busy,
                started_at,
            };
        };

        info!("Dispatch {} started for {}", id, hazard);
        self.page.reset_result().await;
        self.page.show_status("Processing...", StatusClass::Info).await;

        let location = self.locate().await;
        let location_text = location.to_string();

        let failure = match self.request_server_alert(hazard, &location_text, id).await {
            Ok(record) => {
                render_result(&self.page, &record, hazard, &location).await;
                self.page.hide_status().await;
                info!("Dispatch {} rendered server guidance", id);
                return DispatchReport {
                    id,
                    hazard,
                    location: location_text,
                    outcome: DispatchOutcome::Server,
                    started_at,
                };
            }
            Err(err) => err,
        };

        let reason = failure.kind();
        warn!("Dispatch {}: server path failed ({}): {}; fallback activated", id, reason, failure);

        self.page.set_fallback_notice(true).await;
        let record = self.fallback_record(hazard);
        render_result(&self.page, &record, hazard, &location).await;
        self.page.hide_status().await;

        DispatchReport {
            id,
            hazard,
            location: location_text,
            outcome: DispatchOutcome::Fallback { reason },
            started_at,
        }
    }

    async fn request_server_alert(
        &self,
        hazard: HazardType,
        location: &str,
        id: Uuid,
    ) -> Result<FallbackRecord, CoordinatorError> {
        if !self.connectivity.is_online() {
            return Err(CoordinatorError::Offline);
        }
        self.api.request_alert(hazard, location, id).await
    }

    fn fallback_record(&self, hazard: HazardType) -> FallbackRecord {
        self.dataset.record_or_generic(hazard)
    }

    /// Fetch richer guidance for `hazard` into the instructions panel.
    ///
    /// Failures show a timed error status; this path never renders the
    /// static dataset.
    pub async fn fetch_instructions(&self, hazard: HazardType, location: &str) -> InstructionsOutcome {
        let id = Uuid::new_v4();
        self.page
            .show_status("Getting safety instructions...", StatusClass::Info)
            .await;

        let attempt = if self.connectivity.is_online() {
            self.api.request_instructions(hazard, location, id).await
        } else {
            Err(CoordinatorError::Offline)
        };

        match attempt {
            Ok(info) => {
                self.page.show_instructions(instructions_html(&info)).await;
                self.page.hide_status().await;
                info!("Rendered {} instructions ({} steps, {} warnings)", hazard, info.steps.len(), info.warnings.len());
                InstructionsOutcome::Rendered
            }
            Err(err) => {
                error!("Failed to load {} instructions ({}): {}", hazard, err.kind(), err);
                self.page
                    .show_status_for("Failed to load instructions.", StatusClass::Error, self.instructions_error)
                    .await;
                InstructionsOutcome::Failed(err.kind())
            }
        }
    }

    /// The "What to do" action: hazard from the page path, then instructions
    pub async fn what_to_do(&self, page_path: &str) -> InstructionsOutcome {
        let hazard = HazardType::from_page_path(page_path);
        info!("What-to-do requested for {} (path {})", hazard, page_path);

        let location = self.locate().await;
        self.fetch_instructions(hazard, &location.to_string_or_empty()).await
    }

    /// Acquire the device location, reporting progress on the status line
    pub async fn locate(&self) -> LocationString {
        LocationString::from_position(self.location.acquire(&self.page).await)
    }

    /// Copy the displayed SMS text to the clipboard
    pub async fn copy_sms(&self) -> Result<(), CoordinatorError> {
        self.copy_button.click(&self.page).await
    }
}

/// Wires injected capabilities into an [`EmergencyCoordinator`]
pub struct CoordinatorBuilder {
    config: CoordinatorConfig,
    connectivity: ConnectivityWatch,
    page: Option<Page>,
    dataset: Option<FallbackDataset>,
    geolocation: Option<Box<dyn GeolocationProvider>>,
    clipboard: Option<Box<dyn Clipboard>>,
}

impl CoordinatorBuilder {
    pub fn page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    pub fn dataset(mut self, dataset: FallbackDataset) -> Self {
        self.dataset = Some(dataset);
        self
    }

    pub fn geolocation(mut self, provider: Box<dyn GeolocationProvider>) -> Self {
        self.geolocation = Some(provider);
        self
    }

    pub fn clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn build(self) -> Result<EmergencyCoordinator, CoordinatorError> {
        self.config.validate()?;

        let dataset = match (self.dataset, &self.config.fallback_dataset_path) {
            (Some(dataset), _) => dataset,
            (None, Some(path)) => FallbackDataset::load_from_file(path)?,
            (None, None) => FallbackDataset::builtin(),
        };

        let location = LocationService::new(
            self.geolocation.unwrap_or_else(|| Box::new(UnsupportedGeolocation)),
            self.config.position_options(),
            self.config.location_timeout(),
            self.config.location_warning(),
        );

        let api = EmergencyApiClient::new(&self.config.server_url, self.config.request_timeout())?;

        let copy_button = CopyButton::new(
            self.clipboard.unwrap_or_else(|| Box::new(MemoryClipboard::new())),
            self.config.copy_feedback(),
        );

        info!(
            "Coordinator ready (server: {}, location timeout: {:?})",
            api.base_url(),
            location.hard_timeout()
        );

        Ok(EmergencyCoordinator {
            page: self.page.unwrap_or_default(),
            dataset,
            connectivity: self.connectivity,
            location,
            api,
            copy_button,
            instructions_error: self.config.instructions_error(),
            in_flight: AtomicBool::new(false),
        })
    }
}
