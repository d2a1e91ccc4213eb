use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use edgewatch::core::{BoundingBox, Detection};
use edgewatch::engine::{Devices, Runtime};
use edgewatch::hal::mock::{ScriptedDetector, SimulatedCamera, SimulatedEdgeSource};
use edgewatch::hal::{AnnotationStore, DirectoryStore, SerialTransport};
use edgewatch::PipelineConfig;
use log::{error, info};

#[derive(Parser, Debug)]
#[command(name = "edgewatch", version, about = "Motion-triggered detection bursts with radio notification")]
struct Cli {
    #[arg(long, help = "Pipeline configuration file (JSON)")]
    config: Option<PathBuf>,

    #[arg(
        long,
        default_value_t = 10_000,
        help = "Interval between simulated motion edges in milliseconds"
    )]
    motion_interval_ms: u64,
}

/// Detector script for the simulated camera: a person walking through frame
fn demo_detector() -> ScriptedDetector {
    let person = |confidence| {
        Detection::new("person", confidence).with_bbox(BoundingBox {
            x: 412.0,
            y: 96.0,
            width: 180.0,
            height: 410.0,
        })
    };

    ScriptedDetector::new()
        .then_detect(vec![person(0.82), Detection::new("dog", 0.41)])
        .then_nothing()
        .then_detect(vec![person(0.74)])
        .then_detect(vec![Detection::new("cat", 0.38)])
        .then_nothing()
        .with_inference_cost(Duration::from_millis(60))
        .repeating()
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    info!("Initializing components...");
    let store: Option<Box<dyn AnnotationStore>> = if config.persist_detections {
        Some(Box::new(DirectoryStore::new(config.detections_dir.clone())?))
    } else {
        None
    };

    let devices = Devices {
        edge: Box::new(
            SimulatedEdgeSource::periodic(Duration::from_millis(cli.motion_interval_ms))
                .with_debounce(config.edge.debounce()),
        ),
        camera: Box::new(
            SimulatedCamera::new(config.capture.width, config.capture.height)
                .with_capture_cost(Duration::from_millis(30)),
        ),
        detector: Box::new(demo_detector()),
        transport: Box::new(SerialTransport::from_config(&config.serial)),
        store,
    };

    let mut runtime = Runtime::new(config);
    runtime.start(devices).await?;

    info!("--- Smart camera pipeline is active ---");
    info!("Press Ctrl+C to exit.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Stopping...");
    let result = runtime.shutdown().await;
    if let Err(e) = &result {
        error!("Burst worker ended with error: {:#}", e);
    }
    info!("{}", runtime.monitor().generate_report());
    info!("Camera and edge trigger stopped. Exiting.");
    result
}
