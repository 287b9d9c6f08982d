use aidgen_coordinator::config::CoordinatorConfig;
use aidgen_coordinator::connectivity::Connectivity;
use aidgen_coordinator::fallback::FallbackDataset;
use aidgen_coordinator::{EmergencyCoordinator, HazardType};
use std::io::Write;
use tokio_test::{assert_err, assert_ok};

const CUSTOM_DATASET: &str = r#"
earthquake:
  title: Sismo
  summary: Agáchate, cúbrete y sujétate.
  steps: ["Agáchate", "Cúbrete", "Sujétate"]
  sms_template: "SISMO! Estoy en [LOCATION]."
fire:
  title: Incendio
  summary: Sal rápido.
  steps: ["Gatea bajo el humo"]
  sms_template: "INCENDIO en [LOCATION]."
flood:
  title: Inundación
  summary: Busca terreno alto.
  steps: ["Sube a terreno alto"]
  sms_template: "INUNDACIÓN en [LOCATION]."
tsunami:
  title: Tsunami
  summary: Aléjate de la costa.
  steps: ["Sube a terreno alto"]
  sms_template: "TSUNAMI en [LOCATION]."
general:
  title: Emergencia
  summary: Mantén la calma.
  steps: ["Llama a emergencias"]
  sms_template: "EMERGENCIA en [LOCATION]."
"#;

fn write_dataset(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_dataset_from_yaml() {
    let file = write_dataset(CUSTOM_DATASET);
    let dataset = assert_ok!(FallbackDataset::load_from_file(file.path()));

    assert_eq!(dataset.len(), HazardType::ALL.len());
    assert_eq!(dataset.get(HazardType::Earthquake).unwrap().steps.len(), 3);
}

#[test]
fn test_incomplete_dataset_is_rejected() {
    let file = write_dataset(
        r#"
fire:
  title: Fire
  summary: Get out
  steps: ["Crawl low"]
  sms_template: "FIRE at [LOCATION]"
"#,
    );
    let err = assert_err!(FallbackDataset::load_from_file(file.path()));
    assert!(err.to_string().contains("missing records"));
}

#[test]
fn test_unknown_hazard_key_is_rejected() {
    let file = write_dataset("volcano:\n  title: Volcano\n");
    assert_err!(FallbackDataset::load_from_file(file.path()));
}

#[tokio::test]
async fn test_configured_dataset_drives_fallback() {
    let file = write_dataset(CUSTOM_DATASET);
    let config = CoordinatorConfig {
        fallback_dataset_path: Some(file.path().to_path_buf()),
        ..CoordinatorConfig::default()
    };

    let connectivity = Connectivity::new(false);
    let coordinator = EmergencyCoordinator::builder(config, connectivity.watch())
        .build()
        .unwrap();
    coordinator.handle_emergency(HazardType::Fire).await;

    let result = coordinator.page().snapshot().await.result;
    assert_eq!(result.title, "Incendio");
    assert_eq!(result.sms_text, "INCENDIO en [LOCATION UNAVAILABLE].");
}
