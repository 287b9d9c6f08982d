#![allow(dead_code)]

use aidgen_coordinator::clipboard::{Clipboard, MemoryClipboard};
use aidgen_coordinator::config::CoordinatorConfig;
use aidgen_coordinator::connectivity::Connectivity;
use aidgen_coordinator::location::{FixedGeolocation, GeolocationProvider, Position, PositionOptions};
use aidgen_coordinator::{CoordinatorError, EmergencyCoordinator};
use async_trait::async_trait;
use std::sync::Arc;

/// Position whose formatted form is "Lat: 1.2345, Long: 6.7890"
pub fn test_position() -> Position {
    Position::new(1.2345, 6.789)
}

pub const TEST_LOCATION: &str = "Lat: 1.2345, Long: 6.7890";

/// Configuration with short bounds so failing paths finish quickly
pub fn test_config(server_url: &str) -> CoordinatorConfig {
    CoordinatorConfig {
        server_url: server_url.to_string(),
        location_timeout_ms: 200,
        request_timeout_ms: 2_000,
        ..CoordinatorConfig::default()
    }
}

/// Geolocation that never answers, like a device stuck acquiring a fix
pub struct StalledGeolocation;

#[async_trait]
impl GeolocationProvider for StalledGeolocation {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, CoordinatorError> {
        std::future::pending().await
    }
}

pub struct DeniedGeolocation;

#[async_trait]
impl GeolocationProvider for DeniedGeolocation {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, CoordinatorError> {
        Err(CoordinatorError::PermissionDenied("User denied Geolocation".to_string()))
    }
}

/// Clipboard handle the test keeps a copy of
#[derive(Clone, Default)]
pub struct SharedClipboard(pub Arc<MemoryClipboard>);

#[async_trait]
impl Clipboard for SharedClipboard {
    async fn write_text(&self, text: &str) -> Result<(), CoordinatorError> {
        self.0.write_text(text).await
    }
}

pub struct DeniedClipboard;

#[async_trait]
impl Clipboard for DeniedClipboard {
    async fn write_text(&self, _text: &str) -> Result<(), CoordinatorError> {
        Err(CoordinatorError::ClipboardFailure("Write permission denied".to_string()))
    }
}

/// Coordinator with a fixed test position
pub fn setup_coordinator(server_url: &str, online: bool) -> (Connectivity, EmergencyCoordinator) {
    setup_with_geolocation(server_url, online, Box::new(FixedGeolocation(test_position())))
}

pub fn setup_with_geolocation(
    server_url: &str,
    online: bool,
    geolocation: Box<dyn GeolocationProvider>,
) -> (Connectivity, EmergencyCoordinator) {
    let connectivity = Connectivity::new(online);
    let coordinator = EmergencyCoordinator::builder(test_config(server_url), connectivity.watch())
        .geolocation(geolocation)
        .build()
        .expect("Failed to build test coordinator");
    (connectivity, coordinator)
}
