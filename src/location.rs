//! Device location acquisition
//!
//! The device API sits behind [`GeolocationProvider`]. [`LocationService`]
//! races it against a hard timeout and never returns an error: every
//! failure becomes "no location" and callers substitute the sentinel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{CoordinatorError, ErrorKind};
use crate::page::{Page, StatusClass};

/// Sentinel used wherever a location could not be obtained
pub const LOCATION_UNAVAILABLE: &str = "[LOCATION UNAVAILABLE]";

/// Coordinate pair reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters, when the device reports one
    pub accuracy: Option<f64>,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }
}

/// Options passed to the device for a single position query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the device may return; zero forces a fresh fix
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(15),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Single-shot geolocation capability
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// `false` when the platform has no geolocation support at all
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self, options: PositionOptions) -> Result<Position, CoordinatorError>;
}

/// Provider for platforms without geolocation
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedGeolocation;

#[async_trait]
impl GeolocationProvider for UnsupportedGeolocation {
    fn is_supported(&self) -> bool {
        false
    }

    async fn current_position(&self, _options: PositionOptions) -> Result<Position, CoordinatorError> {
        Err(CoordinatorError::GeolocationUnsupported)
    }
}

/// Provider that always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocation(pub Position);

#[async_trait]
impl GeolocationProvider for FixedGeolocation {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, CoordinatorError> {
        Ok(self.0)
    }
}

/// Location as it appears in requests and SMS text
#[derive(Debug, Clone, PartialEq)]
pub enum LocationString {
    Coordinates { latitude: f64, longitude: f64 },
    Unavailable,
}

impl LocationString {
    pub fn from_position(position: Option<Position>) -> Self {
        match position {
            Some(p) => LocationString::Coordinates {
                latitude: p.latitude,
                longitude: p.longitude,
            },
            None => LocationString::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, LocationString::Coordinates { .. })
    }

    /// Like `to_string`, but the unavailable case yields an empty string.
    /// The instructions endpoint expects an empty location rather than the sentinel.
    pub fn to_string_or_empty(&self) -> String {
        match self {
            LocationString::Coordinates { .. } => self.to_string(),
            LocationString::Unavailable => String::new(),
        }
    }
}

impl fmt::Display for LocationString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationString::Coordinates { latitude, longitude } => {
                write!(f, "Lat: {:.4}, Long: {:.4}", latitude, longitude)
            }
            LocationString::Unavailable => f.write_str(LOCATION_UNAVAILABLE),
        }
    }
}

/// Location acquisition with a hard upper bound on waiting
pub struct LocationService {
    provider: Box<dyn GeolocationProvider>,
    options: PositionOptions,
    hard_timeout: Duration,
    warning_display: Duration,
}

impl LocationService {
    pub fn new(
        provider: Box<dyn GeolocationProvider>,
        options: PositionOptions,
        hard_timeout: Duration,
        warning_display: Duration,
    ) -> Self {
        Self {
            provider,
            options,
            hard_timeout,
            warning_display,
        }
    }

    pub fn hard_timeout(&self) -> Duration {
        self.hard_timeout
    }

    /// Try to obtain the device position, reporting progress on the status line.
    ///
    /// Returns `None` on any failure. The provider future is dropped when the
    /// hard timeout fires first; whatever it would have produced is ignored.
    pub async fn acquire(&self, page: &Page) -> Option<Position> {
        page.show_status("Getting your location...", StatusClass::Info).await;

        if !self.provider.is_supported() {
            let err = CoordinatorError::GeolocationUnsupported;
            warn!("Location unavailable ({}): {}", err.kind(), err);
            page.show_status("Geolocation not supported.", StatusClass::Error).await;
            return None;
        }

        let attempt = tokio::time::timeout(
            self.hard_timeout,
            self.provider.current_position(self.options),
        )
        .await
        .unwrap_or(Err(CoordinatorError::LocationTimeout(self.hard_timeout)));

        match attempt {
            Ok(position) => {
                info!(
                    "Location acquired (accuracy: {:?} m)",
                    position.accuracy
                );
                page.hide_status().await;
                Some(position)
            }
            Err(err) => {
                warn!("Location unavailable ({}): {}", err.kind(), err);
                if err.kind() == ErrorKind::CapabilityUnavailable {
                    page.show_status("Geolocation not supported.", StatusClass::Error).await;
                } else {
                    page.show_status_for(
                        "Unable to access location.",
                        StatusClass::Warning,
                        self.warning_display,
                    )
                    .await;
                }
                debug!("Continuing without location");
                None
            }
        }
    }
}
