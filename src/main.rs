//! Terminal front end for the emergency response coordinator
//!
//! Drives one coordinator action and prints the resulting page.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aidgen_coordinator::clipboard::Osc52Clipboard;
use aidgen_coordinator::config::CoordinatorConfig;
use aidgen_coordinator::connectivity::{attach_indicator, Connectivity};
use aidgen_coordinator::fallback::FallbackDataset;
use aidgen_coordinator::location::{
    FixedGeolocation, GeolocationProvider, LocationString, Position, UnsupportedGeolocation,
};
use aidgen_coordinator::page::PageState;
use aidgen_coordinator::render::fill_sms_template;
use aidgen_coordinator::{EmergencyCoordinator, HazardType};

#[derive(Parser)]
#[command(name = "aidgen")]
#[command(about = "Emergency guidance with offline fallback and SMS drafting")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server base URL, overriding the configuration
    #[arg(long)]
    server: Option<String>,

    /// Treat the device as offline
    #[arg(long)]
    offline: bool,

    /// Device latitude; without coordinates the location is unavailable
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Device longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Print the page state as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch an emergency alert, falling back to offline guidance
    Alert {
        hazard: HazardType,

        /// Copy the SMS text to the terminal clipboard afterwards
        #[arg(long)]
        copy: bool,
    },
    /// Fetch detailed safety instructions from the server
    Instructions {
        hazard: HazardType,
    },
    /// Fetch instructions for the hazard named in a page path
    WhatToDo {
        path: String,
    },
    /// Print the built-in offline guidance for a hazard
    Fallback {
        hazard: HazardType,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aidgen_coordinator=debug,aidgen=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = CoordinatorConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    info!("Configuration loaded");

    let position = match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => Some(Position::new(lat, lon)),
        _ => None,
    };

    if let Commands::Fallback { hazard } = &cli.command {
        let dataset = match &config.fallback_dataset_path {
            Some(path) => FallbackDataset::load_from_file(path)?,
            None => FallbackDataset::builtin(),
        };
        let record = dataset.record_or_generic(*hazard);
        let location = LocationString::from_position(position);
        println!("{}", record.title);
        println!("{}", record.summary);
        for (i, step) in record.steps.iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
        println!("SMS: {}", fill_sms_template(&record.sms_template, &location.to_string()));
        return Ok(());
    }

    let connectivity = Connectivity::new(!cli.offline);
    let geolocation: Box<dyn GeolocationProvider> = match position {
        Some(position) => Box::new(FixedGeolocation(position)),
        None => Box::new(UnsupportedGeolocation),
    };

    let coordinator = EmergencyCoordinator::builder(config, connectivity.watch())
        .geolocation(geolocation)
        .clipboard(Box::new(Osc52Clipboard::new(std::io::stdout())))
        .build()
        .context("building coordinator")?;

    let indicator = attach_indicator(connectivity.watch(), coordinator.page().clone());

    match cli.command {
        Commands::Alert { hazard, copy } => {
            let report = coordinator.handle_emergency(hazard).await;
            info!("Dispatch finished: {:?}", report.outcome);
            if copy {
                if let Err(e) = coordinator.copy_sms().await {
                    warn!("SMS not copied: {}", e);
                }
            }
        }
        Commands::Instructions { hazard } => {
            let location = coordinator.locate().await;
            coordinator
                .fetch_instructions(hazard, &location.to_string_or_empty())
                .await;
        }
        Commands::WhatToDo { path } => {
            coordinator.what_to_do(&path).await;
        }
        Commands::Fallback { .. } => {}
    }

    drop(connectivity);
    indicator.await.context("connectivity indicator task")?;
    let state = coordinator.page().snapshot().await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print_page(&state);
    }

    Ok(())
}

fn print_page(state: &PageState) {
    println!("[{}]", state.connectivity.label);

    if state.status.visible {
        println!("{}", state.status.text);
    }

    if state.result.visible {
        if state.fallback_notice_visible {
            println!("(offline guidance: server unavailable)");
        }
        println!("{}", state.result.title);
        println!("{}", state.result.summary);
        for (i, step) in state.result.steps.iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
        println!("SMS: {}", state.result.sms_text);
    }

    if state.instructions.visible {
        println!("{}", state.instructions.html);
    }

    for notice in &state.notices {
        println!("! {}", notice);
    }
}
