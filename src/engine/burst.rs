use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::{info, warn};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, watch};
use tokio::time::{Duration, Instant};

use super::{Aggregator, BurstState, BurstSummary, FramePacer, TriggerSignal};
use crate::config::PipelineConfig;
use crate::core::top_detection;
use crate::hal::{AnnotationStore, Detector, ManagedCamera};
use crate::notify::{DispatchOutcome, NotificationDispatcher};
use crate::observability::PipelineMetrics;
use crate::resilience::{FrameGuard, FrameStage};

/// Burst shape and per-frame limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstSettings {
    pub burst_count: u32,
    pub frame_interval: Duration,
    pub frame_timeout: Option<Duration>,
}

impl Default for BurstSettings {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for BurstSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            burst_count: config.burst_count,
            frame_interval: config.frame_interval(),
            frame_timeout: config.frame_timeout(),
        }
    }
}

/// True once shutdown was sent or every sender is gone
fn shutdown_requested(rx: &mut broadcast::Receiver<()>) -> bool {
    !matches!(rx.try_recv(), Err(TryRecvError::Empty))
}

/// Sole consumer of the trigger signal.
///
/// Owns the camera, the detector and the annotation store for its whole life.
/// Shutdown is honoured while waiting and at every frame boundary.
pub struct BurstProcessor {
    camera: ManagedCamera,
    detector: Box<dyn Detector>,
    store: Option<Box<dyn AnnotationStore>>,
    signal: Arc<TriggerSignal>,
    dispatcher: NotificationDispatcher,
    guard: FrameGuard,
    pacer: FramePacer,
    burst_count: u32,
    metrics: Arc<PipelineMetrics>,
    state_tx: watch::Sender<BurstState>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl BurstProcessor {
    pub fn new(
        camera: ManagedCamera,
        detector: Box<dyn Detector>,
        signal: Arc<TriggerSignal>,
        dispatcher: NotificationDispatcher,
        shutdown_rx: broadcast::Receiver<()>,
        settings: BurstSettings,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        let (state_tx, _) = watch::channel(BurstState::Waiting);
        Self {
            camera,
            detector,
            store: None,
            signal,
            dispatcher,
            guard: FrameGuard::new(settings.frame_timeout, metrics.clone()),
            pacer: FramePacer::new(settings.frame_interval),
            burst_count: settings.burst_count,
            metrics,
            state_tx,
            shutdown_rx,
        }
    }

    pub fn with_store(mut self, store: Box<dyn AnnotationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn state(&self) -> BurstState {
        *self.state_tx.borrow()
    }

    /// Follow state changes from another task
    pub fn state_watch(&self) -> watch::Receiver<BurstState> {
        self.state_tx.subscribe()
    }

    fn transition_to(&mut self, next: BurstState) -> Result<()> {
        let current = self.state();
        if !current.can_transition_to(&next) {
            return Err(anyhow!(
                "Invalid burst state transition: {} -> {}",
                current.name(),
                next.name()
            ));
        }
        self.state_tx.send_replace(next);
        Ok(())
    }

    /// Wait for triggers and process bursts until shutdown.
    /// The camera is stopped on every way out of this function.
    pub async fn run(mut self) -> Result<()> {
        info!("Burst processor started. Waiting for motion...");
        let result = self.run_loop().await;

        if let Err(e) = self.camera.stop().await {
            warn!("Failed to stop camera: {:#}", e);
        }
        if self.state() != BurstState::Stopped {
            self.state_tx.send_replace(BurstState::Stopped);
        }
        info!("Burst processor stopped.");
        result
    }

    async fn run_loop(&mut self) -> Result<()> {
        loop {
            let signal = self.signal.clone();
            tokio::select! {
                _ = signal.wait() => {}
                _ = self.shutdown_rx.recv() => {
                    info!("Shutdown requested while waiting for motion");
                    self.transition_to(BurstState::Stopped)?;
                    return Ok(());
                }
            }

            if self.run_once().await?.is_none() {
                return Ok(());
            }
            info!("Burst processor is waiting for next motion event...");
        }
    }

    /// Process one triggered burst, dispatch its summary and re-arm the trigger.
    /// Returns `None` if shutdown interrupted the burst.
    pub async fn run_once(&mut self) -> Result<Option<DispatchOutcome>> {
        let Some(summary) = self.run_burst().await? else {
            self.signal.clear();
            return Ok(None);
        };

        let outcome = self.dispatcher.dispatch(&summary);
        // Edges seen during the burst and dispatch are coalesced here
        self.signal.clear();
        self.transition_to(BurstState::Waiting)?;
        Ok(Some(outcome))
    }

    /// Capture and analyse one burst of frames.
    /// Returns `None` if shutdown interrupted the burst.
    pub async fn run_burst(&mut self) -> Result<Option<BurstSummary>> {
        info!("Processing thread active. Capturing burst...");
        let burst_start = Instant::now();
        let mut aggregator = Aggregator::new();

        for frame_number in 1..=self.burst_count {
            if shutdown_requested(&mut self.shutdown_rx) {
                warn!(
                    "Burst cancelled by shutdown at frame {}/{}",
                    frame_number, self.burst_count
                );
                self.metrics.record_burst_cancelled();
                self.transition_to(BurstState::Stopped)?;
                return Ok(None);
            }
            self.transition_to(BurstState::Capturing {
                frame: frame_number,
            })?;

            let frame_start = Instant::now();
            self.process_frame(frame_number, &mut aggregator).await;
            let elapsed = frame_start.elapsed();

            self.metrics.record_frame(elapsed);
            info!("  Frame {} took {:.2}s", frame_number, elapsed.as_secs_f64());
            self.pacer.pace(elapsed).await;
        }

        info!(
            "Burst processing finished in {:.2}s.",
            burst_start.elapsed().as_secs_f64()
        );
        self.transition_to(BurstState::Finalizing)?;

        let summary = aggregator.finalize();
        if summary.has_detections() {
            info!("Burst average confidence: {:.2}", summary.mean_confidence);
            info!("Most common detection: {}", summary.dominant_label);
        }
        self.metrics.record_burst_completed();
        Ok(Some(summary))
    }

    async fn process_frame(&mut self, frame_number: u32, aggregator: &mut Aggregator) {
        let total = self.burst_count;

        let Some(frame) = self
            .guard
            .run(FrameStage::Capture, frame_number, self.camera.capture())
            .await
        else {
            return;
        };

        let Some(detections) = self
            .guard
            .run(FrameStage::Inference, frame_number, self.detector.infer(&frame))
            .await
        else {
            return;
        };

        let Some(top) = top_detection(&detections) else {
            info!("  [Frame {}/{}] No objects detected.", frame_number, total);
            return;
        };

        info!(
            "  [Frame {}/{}] DETECTED {} objects.",
            frame_number,
            total,
            detections.len()
        );
        for detection in &detections {
            info!(
                "    -> {} (Confidence: {:.2})",
                detection.label, detection.confidence
            );
        }

        aggregator.record_hit(&top.label, top.confidence);
        self.metrics.record_detection_frame();

        if let Some(store) = self.store.as_mut() {
            match store.persist(&frame, frame_number, &detections) {
                Ok(path) => info!("    Saved detection to: {}", path.display()),
                Err(e) => {
                    self.metrics.record_persist_error();
                    warn!("    Failed to save detection frame {}: {:#}", frame_number, e);
                }
            }
        }
    }
}
