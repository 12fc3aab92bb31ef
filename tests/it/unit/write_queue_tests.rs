//! Write queue bookkeeping: dirty flags, result draining, stale retries.

use crate::helpers::{FlakyStore, SlowStore, fast_retry};
use occlude::persistence::{MemoryStore, RetryPolicy, WriteEvent, WriteQueue};
use occlude::{ImageId, Marker, Rect};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

fn markers(n: usize) -> Vec<Marker> {
    (0..n)
        .map(|i| Marker::from_rect(Rect::new(i as f32 * 30.0, 0.0, 20.0, 20.0)))
        .collect()
}

#[test]
fn test_idle_queue_reports_nothing() {
    let queue = WriteQueue::new(Arc::new(MemoryStore::new()), RetryPolicy::no_retry()).unwrap();
    queue.flush();
    assert!(!queue.has_pending());
    assert_eq!(queue.pending_count(), 0);
    assert!(queue.process_results().is_empty());
    assert!(!queue.is_dirty(&ImageId::new("image-1")));
}

#[test]
fn test_dirty_until_written() {
    let store = Arc::new(SlowStore::new(Duration::from_millis(30)));
    let queue = WriteQueue::new(store, fast_retry(1)).unwrap();
    let image = ImageId::new("image-1");

    queue.enqueue(image.clone(), markers(1));
    assert!(queue.is_dirty(&image));
    assert!(queue.has_pending());

    queue.flush();
    assert!(!queue.is_dirty(&image));
    assert_eq!(queue.write_latency().count(), 1);
    assert!(queue.write_latency().max() >= 30.0);
}

#[test]
fn test_results_drain_once() {
    let store = Arc::new(MemoryStore::new());
    let queue = WriteQueue::new(store, fast_retry(1)).unwrap();
    queue.enqueue(ImageId::new("a"), markers(1));
    queue.flush();
    queue.enqueue(ImageId::new("b"), markers(2));
    queue.flush();

    let events = queue.process_results();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| matches!(e, WriteEvent::Saved { attempts: 1, .. })));
    assert!(queue.process_results().is_empty());
}

#[test]
fn test_newer_snapshot_supersedes_failing_retry() {
    let store = Arc::new(FlakyStore::new(1));
    let policy = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(200),
        max_delay: Duration::from_millis(200),
    };
    let queue = WriteQueue::new(store.clone(), policy).unwrap();
    let image = ImageId::new("image-1");

    queue.enqueue(image.clone(), markers(1));
    let deadline = Instant::now() + Duration::from_secs(5);
    while store.attempts.load(Ordering::SeqCst) == 0 {
        assert!(Instant::now() < deadline, "writer never attempted the save");
        std::thread::yield_now();
    }
    // The first attempt failed and the writer is backing off
    queue.enqueue(image.clone(), markers(2));
    queue.flush();

    let events = queue.process_results();
    assert!(matches!(
        events.as_slice(),
        [WriteEvent::Superseded { .. }, WriteEvent::Saved { attempts: 1, .. }]
    ));
    assert_eq!(store.inner.stored(&image).unwrap(), markers(2));
    assert!(!queue.is_dirty(&image));
}
