use edgewatch::engine::{EdgeTrigger, TriggerSignal};
use edgewatch::observability::PipelineMetrics;
use std::sync::Arc;
use tokio::time::{timeout, Duration};

#[tokio::test]
async fn test_wait_returns_when_set_before_wait() {
    let signal = TriggerSignal::new();
    signal.set();

    timeout(Duration::from_millis(50), signal.wait())
        .await
        .expect("wait should return immediately for a pending signal");
}

#[tokio::test]
async fn test_wait_wakes_on_set_from_other_task() {
    let signal = Arc::new(TriggerSignal::new());

    let waiter = {
        let signal = signal.clone();
        tokio::spawn(async move { signal.wait().await })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!waiter.is_finished());

    signal.set();
    timeout(Duration::from_millis(100), waiter)
        .await
        .expect("waiter should wake")
        .unwrap();
}

#[tokio::test]
async fn test_wait_blocks_after_clear() {
    let signal = TriggerSignal::new();
    signal.set();
    signal.wait().await;
    signal.clear();

    // A permit left over from the earlier set must not wake a clear signal
    let result = timeout(Duration::from_millis(30), signal.wait()).await;
    assert!(result.is_err(), "wait should block while the signal is clear");
}

#[tokio::test]
async fn test_concurrent_edges_set_signal_once() {
    let metrics = Arc::new(PipelineMetrics::new());
    let signal = Arc::new(TriggerSignal::new());
    let trigger = EdgeTrigger::new(signal.clone(), metrics.clone());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let trigger = trigger.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    trigger.on_edge();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(signal.is_set());
    assert_eq!(metrics.edges_seen(), 200);
    assert_eq!(metrics.edges_coalesced(), 199);
}
