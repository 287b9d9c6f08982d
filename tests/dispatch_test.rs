//! Emergency dispatch tests
//!
//! Server path, fallback path and the location race, against a mock server.

use aidgen_coordinator::fallback::FallbackDataset;
use aidgen_coordinator::location::LOCATION_UNAVAILABLE;
use aidgen_coordinator::{DispatchOutcome, ErrorKind, HazardType};
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::*;

#[tokio::test]
async fn test_every_hazard_reaches_rendered_state_offline() {
    let (_connectivity, coordinator) = setup_coordinator("http://127.0.0.1:9", false);
    let dataset = FallbackDataset::builtin();

    for hazard in HazardType::ALL {
        let report = coordinator.handle_emergency(hazard).await;
        assert!(report.used_fallback(), "{} did not fall back", hazard);

        let state = coordinator.page().snapshot().await;
        assert!(state.result.visible, "{} left the result hidden", hazard);
        assert!(state.fallback_notice_visible);
        assert_eq!(state.result.title, dataset.get(hazard).unwrap().title);
    }
}

#[tokio::test]
async fn test_offline_never_calls_server() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/alert"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (_connectivity, coordinator) = setup_coordinator(&mock_server.uri(), false);
    let report = coordinator.handle_emergency(HazardType::Flood).await;

    assert_eq!(report.fallback_reason(), Some(ErrorKind::NetworkFailure));

    let record = FallbackDataset::builtin().get(HazardType::Flood).cloned().unwrap();
    let result = coordinator.page().snapshot().await.result;
    assert_eq!(result.title, record.title);
    assert_eq!(result.summary, record.summary);
    assert_eq!(result.steps, record.steps);
    assert_eq!(
        result.sms_text,
        format!("FLOOD ALERT! Trapped at {}. Water rising. Need help!", TEST_LOCATION)
    );

    mock_server.verify().await;
}

#[tokio::test]
async fn test_server_error_behaves_like_offline() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/alert"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (_online, online_coordinator) = setup_coordinator(&mock_server.uri(), true);
    let (_offline, offline_coordinator) = setup_coordinator(&mock_server.uri(), false);

    let report = online_coordinator.handle_emergency(HazardType::Fire).await;
    offline_coordinator.handle_emergency(HazardType::Fire).await;

    assert_eq!(report.fallback_reason(), Some(ErrorKind::NetworkFailure));

    let from_error = online_coordinator.page().snapshot().await;
    let from_offline = offline_coordinator.page().snapshot().await;
    assert!(from_error.fallback_notice_visible);
    assert_eq!(from_error.result, from_offline.result);
}

#[tokio::test]
async fn test_server_record_is_rendered() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/alert"))
        .and(body_json(json!({"type": "earthquake", "location": TEST_LOCATION})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Aftershock Advisory",
            "summary": "Aftershocks expected for 48 hours.",
            "steps": ["Stay clear of damaged buildings", "Keep shoes on"],
            "sms_template": "QUAKE: I'm at [LOCATION], safe for now."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (_connectivity, coordinator) = setup_coordinator(&mock_server.uri(), true);
    let report = coordinator.handle_emergency(HazardType::Earthquake).await;

    assert_eq!(report.outcome, DispatchOutcome::Server);
    let state = coordinator.page().snapshot().await;
    assert!(state.result.visible);
    assert!(!state.fallback_notice_visible);
    assert_eq!(state.result.title, "Aftershock Advisory");
    assert_eq!(state.result.steps.len(), 2);
    assert_eq!(state.result.sms_text, format!("QUAKE: I'm at {}, safe for now.", TEST_LOCATION));
}

#[tokio::test]
async fn test_server_record_without_title_gets_default() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/alert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"steps": ["Evacuate"]})))
        .mount(&mock_server)
        .await;

    let (_connectivity, coordinator) = setup_coordinator(&mock_server.uri(), true);
    coordinator.handle_emergency(HazardType::Tsunami).await;

    let result = coordinator.page().snapshot().await.result;
    assert_eq!(result.title, "Tsunami Emergency");
    assert_eq!(result.sms_text, "");
}

#[tokio::test]
async fn test_malformed_response_falls_back() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/alert"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&mock_server)
        .await;

    let (_connectivity, coordinator) = setup_coordinator(&mock_server.uri(), true);
    let report = coordinator.handle_emergency(HazardType::General).await;

    assert_eq!(report.fallback_reason(), Some(ErrorKind::MalformedResponse));
    let state = coordinator.page().snapshot().await;
    assert!(state.fallback_notice_visible);
    assert_eq!(state.result.title, "General Emergency");
}

#[tokio::test]
async fn test_unreachable_server_falls_back() {
    // Nothing listens on the discard port
    let (_connectivity, coordinator) = setup_coordinator("http://127.0.0.1:9", true);
    let report = coordinator.handle_emergency(HazardType::Fire).await;

    assert_eq!(report.fallback_reason(), Some(ErrorKind::NetworkFailure));
    assert!(coordinator.page().snapshot().await.result.visible);
}

#[tokio::test]
async fn test_stalled_geolocation_still_terminates() {
    let (_connectivity, coordinator) =
        setup_with_geolocation("http://127.0.0.1:9", false, Box::new(StalledGeolocation));

    let started = Instant::now();
    let report = coordinator.handle_emergency(HazardType::Earthquake).await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(report.location, LOCATION_UNAVAILABLE);
    let state = coordinator.page().snapshot().await;
    assert!(state.result.visible);
    assert!(state.result.sms_text.contains(LOCATION_UNAVAILABLE));
}

#[tokio::test]
async fn test_denied_location_sends_sentinel_to_server() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/alert"))
        .and(body_json(json!({"type": "fire", "location": LOCATION_UNAVAILABLE})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Fire",
            "summary": "Get out",
            "steps": ["Crawl low"],
            "sms_template": "FIRE at [LOCATION]"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (_connectivity, coordinator) =
        setup_with_geolocation(&mock_server.uri(), true, Box::new(DeniedGeolocation));
    let report = coordinator.handle_emergency(HazardType::Fire).await;

    assert_eq!(report.outcome, DispatchOutcome::Server);
    assert_eq!(
        coordinator.page().snapshot().await.result.sms_text,
        "FIRE at [LOCATION UNAVAILABLE]"
    );
}

#[tokio::test]
async fn test_concurrent_dispatch_is_ignored() {
    let (_connectivity, coordinator) =
        setup_with_geolocation("http://127.0.0.1:9", false, Box::new(StalledGeolocation));

    let (first, second) = tokio::join!(
        coordinator.handle_emergency(HazardType::Flood),
        coordinator.handle_emergency(HazardType::Fire),
    );

    assert!(first.used_fallback());
    assert_eq!(second.outcome, DispatchOutcome::Busy);
    assert_eq!(coordinator.page().snapshot().await.result.title, "Flood Safety");
    assert!(!coordinator.is_busy());
}

#[tokio::test]
async fn test_connectivity_change_takes_effect_on_next_dispatch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/alert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Server Guidance",
            "summary": "",
            "steps": [],
            "sms_template": ""
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (connectivity, coordinator) = setup_coordinator(&mock_server.uri(), false);
    assert!(coordinator.handle_emergency(HazardType::Flood).await.used_fallback());

    connectivity.set_online(true);
    let report = coordinator.handle_emergency(HazardType::Flood).await;
    assert_eq!(report.outcome, DispatchOutcome::Server);
    assert!(!coordinator.page().snapshot().await.fallback_notice_visible);
}
