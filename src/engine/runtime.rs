use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

use super::{BurstProcessor, BurstSettings, BurstState, EdgeTrigger, TriggerSignal};
use crate::config::PipelineConfig;
use crate::hal::{AnnotationStore, Detector, EdgeSource, FrameSource, ManagedCamera, Transport};
use crate::notify::{NotificationDispatcher, Notifier};
use crate::observability::{PipelineMetrics, PipelineMonitor};

/// How long shutdown waits for queued notifications to go out
const NOTIFIER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeStatus {
    Stopped,
    Initializing,
    Running,
    Error,
}

/// Hardware capabilities handed to the runtime at start
pub struct Devices {
    pub edge: Box<dyn EdgeSource>,
    pub camera: Box<dyn FrameSource>,
    pub detector: Box<dyn Detector>,
    pub transport: Box<dyn Transport>,
    pub store: Option<Box<dyn AnnotationStore>>,
}

/// Runtime wires the edge source, the burst worker and the notifier together
pub struct Runtime {
    config: PipelineConfig,

    /// Current runtime status
    status: RuntimeStatus,

    signal: Arc<TriggerSignal>,
    metrics: Arc<PipelineMetrics>,

    /// Shutdown signal broadcaster
    shutdown_tx: Option<broadcast::Sender<()>>,

    edge: Option<Box<dyn EdgeSource>>,
    worker: Option<JoinHandle<Result<()>>>,
    notifier: Option<JoinHandle<()>>,
    burst_state: Option<watch::Receiver<BurstState>>,
}

impl Runtime {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            status: RuntimeStatus::Stopped,
            signal: Arc::new(TriggerSignal::new()),
            metrics: Arc::new(PipelineMetrics::new()),
            shutdown_tx: None,
            edge: None,
            worker: None,
            notifier: None,
            burst_state: None,
        }
    }

    pub fn status(&self) -> RuntimeStatus {
        self.status
    }

    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        self.metrics.clone()
    }

    pub fn monitor(&self) -> PipelineMonitor {
        PipelineMonitor::new(self.metrics.clone())
    }

    /// Watch the worker state, available once started
    pub fn burst_state(&self) -> Option<watch::Receiver<BurstState>> {
        self.burst_state.clone()
    }

    /// True if the worker exited on its own
    pub fn worker_finished(&self) -> bool {
        self.worker.as_ref().map_or(false, |w| w.is_finished())
    }

    /// Start the pipeline. Initialization failures are fatal and leave
    /// nothing acquired behind.
    pub async fn start(&mut self, devices: Devices) -> Result<()> {
        if self.status == RuntimeStatus::Running {
            return Err(anyhow!("Runtime is already running"));
        }
        self.config.validate()?;

        self.status = RuntimeStatus::Initializing;
        match self.launch(devices).await {
            Ok(()) => {
                self.status = RuntimeStatus::Running;
                Ok(())
            }
            Err(e) => {
                self.status = RuntimeStatus::Error;
                Err(e)
            }
        }
    }

    async fn launch(&mut self, devices: Devices) -> Result<()> {
        let Devices {
            mut edge,
            camera,
            mut detector,
            transport,
            store,
        } = devices;

        let mut camera = ManagedCamera::new(camera);
        camera.start().await.context("Failed to start camera")?;
        info!("Camera initialized and started.");

        if let Err(e) = detector.warm_up().await {
            release_camera(&mut camera).await;
            return Err(e.context("Failed to load detector"));
        }
        info!("Detector loaded.");

        // Subscribe before arming so no shutdown can be missed by the worker
        let (shutdown_tx, _) = broadcast::channel(4);
        let shutdown_rx = shutdown_tx.subscribe();

        self.signal.clear();
        let trigger = EdgeTrigger::new(self.signal.clone(), self.metrics.clone());
        if let Err(e) = edge.arm(trigger).await {
            release_camera(&mut camera).await;
            return Err(e.context("Failed to arm edge source"));
        }
        info!("Edge trigger armed.");

        let (notify_tx, notify_rx) = mpsc::channel(self.config.notify_queue_capacity);
        self.notifier = Some(Notifier::new(transport, notify_rx, self.metrics.clone()).spawn());

        let dispatcher = NotificationDispatcher::new(
            self.config.confidence_threshold,
            notify_tx,
            self.metrics.clone(),
        );
        let mut processor = BurstProcessor::new(
            camera,
            detector,
            self.signal.clone(),
            dispatcher,
            shutdown_rx,
            BurstSettings::from(&self.config),
            self.metrics.clone(),
        );
        if let Some(store) = store {
            processor = processor.with_store(store);
        }

        self.burst_state = Some(processor.state_watch());
        self.worker = Some(tokio::spawn(processor.run()));
        self.edge = Some(edge);
        self.shutdown_tx = Some(shutdown_tx);
        Ok(())
    }

    /// Stop the pipeline: disarm the edge source, stop the worker (which
    /// releases the camera) and let the notifier drain.
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.status == RuntimeStatus::Stopped {
            return Ok(());
        }

        if let Some(mut edge) = self.edge.take() {
            if let Err(e) = edge.disarm().await {
                warn!("Failed to disarm edge source: {:#}", e);
            }
        }

        // Send shutdown signal to the worker
        if let Some(tx) = &self.shutdown_tx {
            let _ = tx.send(());
        }

        let mut result = Ok(());
        if let Some(worker) = self.worker.take() {
            result = match worker.await {
                Ok(outcome) => outcome,
                Err(e) => Err(anyhow!("Burst worker panicked: {}", e)),
            };
        }

        // The worker held the only dispatcher, so the notifier now drains and exits
        if let Some(mut notifier) = self.notifier.take() {
            if timeout(NOTIFIER_DRAIN_TIMEOUT, &mut notifier).await.is_err() {
                warn!("Notifier did not finish in time, abandoning pending notifications");
                notifier.abort();
            }
        }

        self.shutdown_tx = None;
        self.burst_state = None;
        self.status = RuntimeStatus::Stopped;
        result
    }
}

async fn release_camera(camera: &mut ManagedCamera) {
    if let Err(e) = camera.stop().await {
        warn!("Failed to stop camera during cleanup: {:#}", e);
    }
}

/// Note: call `shutdown()` before dropping; Drop can only signal, not await.
impl Drop for Runtime {
    fn drop(&mut self) {
        if let Some(tx) = &self.shutdown_tx {
            let _ = tx.send(());
        }
    }
}
