use edgewatch::core::Detection;
use edgewatch::engine::{BurstProcessor, BurstSettings, BurstState, EdgeTrigger, TriggerSignal};
use edgewatch::hal::mock::{MemoryAnnotationStore, ScriptedDetector, SimulatedCamera};
use edgewatch::hal::ManagedCamera;
use edgewatch::notify::{DispatchOutcome, NotificationCommand, NotificationDispatcher};
use edgewatch::observability::PipelineMetrics;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Duration, Instant};

struct Harness {
    processor: BurstProcessor,
    signal: Arc<TriggerSignal>,
    metrics: Arc<PipelineMetrics>,
    notify_rx: mpsc::Receiver<NotificationCommand>,
    shutdown_tx: broadcast::Sender<()>,
}

async fn harness(camera: SimulatedCamera, detector: ScriptedDetector) -> Harness {
    let metrics = Arc::new(PipelineMetrics::new());
    let signal = Arc::new(TriggerSignal::new());
    let (notify_tx, notify_rx) = mpsc::channel(4);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(4);

    let mut camera = ManagedCamera::new(Box::new(camera));
    camera.start().await.unwrap();

    let processor = BurstProcessor::new(
        camera,
        Box::new(detector),
        signal.clone(),
        NotificationDispatcher::new(0.50, notify_tx, metrics.clone()),
        shutdown_rx,
        BurstSettings::default(),
        metrics.clone(),
    );

    Harness {
        processor,
        signal,
        metrics,
        notify_rx,
        shutdown_tx,
    }
}

fn camera() -> SimulatedCamera {
    SimulatedCamera::new(8, 6)
}

#[tokio::test(start_paused = true)]
async fn test_five_frame_burst_reports_dominant_label() {
    let detector = ScriptedDetector::new()
        .then_detect(vec![Detection::new("person", 0.8), Detection::new("dog", 0.3)])
        .then_nothing()
        .then_detect(vec![Detection::new("person", 0.7)])
        .then_nothing()
        .then_nothing();
    let mut h = harness(camera(), detector).await;

    let summary = h.processor.run_burst().await.unwrap().unwrap();

    assert_eq!(summary.frames_with_detection, 2);
    assert_eq!(summary.mean_confidence, 0.75);
    assert_eq!(summary.dominant_label, "person");
    assert_eq!(h.processor.state(), BurstState::Finalizing);
    assert_eq!(h.metrics.frames_processed(), 5);
    assert_eq!(h.metrics.frames_with_detection(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_run_once_dispatches_and_rearms() {
    let detector = ScriptedDetector::new()
        .then_detect(vec![Detection::new("person", 0.8)])
        .then_nothing()
        .then_detect(vec![Detection::new("person", 0.7)]);
    let mut h = harness(camera(), detector).await;
    h.signal.set();

    let outcome = h.processor.run_once().await.unwrap().unwrap();

    let expected = NotificationCommand::new("person", 75);
    assert_eq!(outcome, DispatchOutcome::Queued(expected.clone()));
    assert_eq!(h.notify_rx.recv().await.unwrap(), expected);
    assert!(!h.signal.is_set());
    assert_eq!(h.processor.state(), BurstState::Waiting);
    assert_eq!(h.metrics.bursts_completed(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_suppressed_burst_still_rearms() {
    let detector = ScriptedDetector::new()
        .then_detect(vec![Detection::new("cat", 0.6)])
        .then_detect(vec![Detection::new("cat", 0.4)]);
    let mut h = harness(camera(), detector).await;
    h.signal.set();

    let outcome = h.processor.run_once().await.unwrap().unwrap();

    assert_eq!(outcome, DispatchOutcome::BelowThreshold { mean_confidence: 0.5 });
    assert!(h.notify_rx.try_recv().is_err());
    assert!(!h.signal.is_set());
    assert_eq!(h.processor.state(), BurstState::Waiting);
}

#[tokio::test(start_paused = true)]
async fn test_empty_burst_sends_nothing() {
    let mut h = harness(camera(), ScriptedDetector::new()).await;
    h.signal.set();

    let outcome = h.processor.run_once().await.unwrap().unwrap();

    assert_eq!(outcome, DispatchOutcome::NoDetections);
    assert!(h.notify_rx.try_recv().is_err());
    assert!(!h.signal.is_set());
}

#[tokio::test(start_paused = true)]
async fn test_frame_failures_do_not_abort_burst() {
    // Capture 2 fails, so the detector script covers frames 1, 3, 4, 5
    let detector = ScriptedDetector::new()
        .then_detect(vec![Detection::new("cat", 0.9)])
        .then_fail("inference engine crashed")
        .then_detect(vec![Detection::new("cat", 0.7)])
        .then_nothing();
    let mut h = harness(camera().fail_capture(2), detector).await;

    let summary = h.processor.run_burst().await.unwrap().unwrap();

    assert_eq!(summary.frames_with_detection, 2);
    assert!((summary.mean_confidence - 0.8).abs() < 1e-6);
    assert_eq!(h.metrics.capture_errors(), 1);
    assert_eq!(h.metrics.inference_errors(), 1);
    assert_eq!(h.metrics.frames_processed(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_hit_frames_are_persisted() {
    let detector = ScriptedDetector::new()
        .then_detect(vec![Detection::new("person", 0.8), Detection::new("dog", 0.4)])
        .then_nothing()
        .then_detect(vec![Detection::new("person", 0.6)]);
    let store = MemoryAnnotationStore::new();
    let mut h = harness(camera(), detector).await;
    h.processor = h.processor.with_store(Box::new(store.clone()));

    h.processor.run_burst().await.unwrap();

    let stored = store.stored();
    let frames: Vec<u32> = stored.iter().map(|s| s.frame_number).collect();
    assert_eq!(frames, vec![1, 3]);
    assert_eq!(stored[0].detections.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_persist_failure_is_not_fatal() {
    let detector = ScriptedDetector::new()
        .then_detect(vec![Detection::new("person", 0.9)])
        .then_detect(vec![Detection::new("person", 0.8)]);
    let mut h = harness(camera(), detector).await;
    h.processor = h.processor.with_store(Box::new(MemoryAnnotationStore::failing()));

    let summary = h.processor.run_burst().await.unwrap().unwrap();

    assert_eq!(summary.frames_with_detection, 2);
    assert_eq!(h.metrics.persist_errors(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fast_frames_are_paced_to_interval() {
    let mut h = harness(
        camera().with_capture_cost(Duration::from_millis(50)),
        ScriptedDetector::new(),
    )
    .await;

    let start = Instant::now();
    h.processor.run_burst().await.unwrap();
    let elapsed = start.elapsed();

    // 50ms of work plus 150ms of sleep per frame
    assert!(elapsed >= Duration::from_millis(1000), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1050), "{:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_slow_frames_are_not_compensated() {
    let mut h = harness(
        camera().with_capture_cost(Duration::from_millis(250)),
        ScriptedDetector::new(),
    )
    .await;

    let start = Instant::now();
    h.processor.run_burst().await.unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(1250), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1300), "{:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_burst_cancels() {
    let mut h = harness(camera(), ScriptedDetector::new()).await;
    h.signal.set();
    h.shutdown_tx.send(()).unwrap();

    let outcome = h.processor.run_once().await.unwrap();

    assert!(outcome.is_none());
    assert_eq!(h.processor.state(), BurstState::Stopped);
    assert_eq!(h.metrics.bursts_cancelled(), 1);
    assert_eq!(h.metrics.frames_processed(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_edges_during_burst_are_coalesced() {
    let detector = ScriptedDetector::new()
        .then_detect(vec![Detection::new("person", 0.9)])
        .repeating();
    let h = harness(camera(), detector).await;
    let trigger = EdgeTrigger::new(h.signal.clone(), h.metrics.clone());
    let mut state = h.processor.state_watch();
    let worker = tokio::spawn(h.processor.run());

    trigger.on_edge();
    state
        .wait_for(|s| matches!(s, BurstState::Capturing { .. }))
        .await
        .unwrap();

    for _ in 0..10 {
        trigger.on_edge();
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    state.wait_for(|s| *s == BurstState::Waiting).await.unwrap();
    assert_eq!(h.metrics.bursts_completed(), 1);
    assert_eq!(h.metrics.edges_coalesced(), 10);
    assert!(!h.signal.is_set());

    h.shutdown_tx.send(()).unwrap();
    worker.await.unwrap().unwrap();
    assert_eq!(h.metrics.bursts_completed(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_mid_burst_releases_camera() {
    let camera = camera().with_capture_cost(Duration::from_millis(20));
    let running = camera.running_flag();
    let mut h = harness(camera, ScriptedDetector::new()).await;
    let mut state = h.processor.state_watch();
    let worker = tokio::spawn(h.processor.run());

    h.signal.set();
    state
        .wait_for(|s| *s == BurstState::Capturing { frame: 2 })
        .await
        .unwrap();
    h.shutdown_tx.send(()).unwrap();

    worker.await.unwrap().unwrap();

    assert!(!running.load(Ordering::SeqCst));
    assert_eq!(*state.borrow(), BurstState::Stopped);
    assert_eq!(h.metrics.bursts_cancelled(), 1);
    assert_eq!(h.metrics.bursts_completed(), 0);
    assert_eq!(h.metrics.frames_processed(), 2);
    assert!(h.notify_rx.try_recv().is_err());
}
