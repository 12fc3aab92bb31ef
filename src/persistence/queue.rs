//! Background write queue with per-image serialization and retry.
//!
//! Modeled as a single worker thread fed through shared state. Results come
//! back over a channel and are drained on the UI thread with
//! [`WriteQueue::process_results`], so callers never block on storage.

use super::MarkerStore;
use crate::constants::RETRY_MAX_DELAY_MS;
use crate::error::{StorageError, StorageResult};
use crate::perf::LatencyStats;
use crate::settings::EngineSettings;
use crate::types::{ImageId, Marker};
use parking_lot::{Condvar, Mutex};
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// How often and how patiently a failed write is retried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            max_attempts: settings.max_write_attempts.max(1),
            base_delay: settings.retry_base_delay(),
            max_delay: Duration::from_millis(RETRY_MAX_DELAY_MS),
        }
    }

    /// No retries at all.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before attempt `attempt + 1`: doubling from the base, capped,
    /// with up to half a base delay of jitter.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(1u32 << (attempt.saturating_sub(1)).min(16));
        let capped = exp.min(self.max_delay);
        let jitter_cap = self.base_delay.as_millis() as u64 / 2;
        let jitter = if jitter_cap > 0 {
            rand::thread_rng().gen_range(0..=jitter_cap)
        } else {
            0
        };
        capped + Duration::from_millis(jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&EngineSettings::default())
    }
}

/// A write that exhausted its retries.
#[derive(Debug)]
pub struct WriteFailure {
    pub image_id: ImageId,
    pub attempts: u32,
    pub error: StorageError,
}

/// Outcome of one queued write, reported by [`WriteQueue::process_results`].
#[derive(Debug)]
pub enum WriteEvent {
    Saved { image_id: ImageId, attempts: u32 },
    /// A newer snapshot arrived while retrying; the stale one was dropped
    Superseded { image_id: ImageId },
    Failed(WriteFailure),
}

#[derive(Default)]
struct QueueState {
    /// Latest snapshot per image that has not started writing
    pending: HashMap<ImageId, Vec<Marker>>,
    /// Images with pending snapshots, oldest request first
    order: VecDeque<ImageId>,
    in_flight: Option<ImageId>,
    /// Images whose last write failed
    failed: HashSet<ImageId>,
    latency: LatencyStats,
    shutdown: bool,
}

impl QueueState {
    fn take_next(&mut self) -> Option<(ImageId, Vec<Marker>)> {
        let image = self.order.pop_front()?;
        let markers = self.pending.remove(&image)?;
        self.in_flight = Some(image.clone());
        Some((image, markers))
    }

    fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_none()
    }
}

struct Shared {
    state: Mutex<QueueState>,
    /// Signals the worker that work arrived or shutdown was requested
    work: Condvar,
    /// Signals flushers that a write finished
    settled: Condvar,
}

/// Serializes marker-list writes per image on a background thread.
///
/// Dropping the queue lets the worker finish everything still pending.
pub struct WriteQueue {
    shared: Arc<Shared>,
    results: Mutex<Receiver<WriteEvent>>,
    worker: Option<JoinHandle<()>>,
}

impl WriteQueue {
    pub fn new(store: Arc<dyn MarkerStore>, policy: RetryPolicy) -> StorageResult<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState::default()),
            work: Condvar::new(),
            settled: Condvar::new(),
        });
        let (tx, rx) = mpsc::channel();

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("occlude-writer".to_string())
            .spawn(move || run_worker(worker_shared, store, policy, tx))
            .map_err(|e| StorageError::QueueClosed(e.to_string()))?;

        Ok(Self {
            shared,
            results: Mutex::new(rx),
            worker: Some(worker),
        })
    }

    /// Queue `markers` as the new stored list for `image`. Never blocks on
    /// storage; replaces any older snapshot for the image still waiting.
    pub fn enqueue(&self, image: ImageId, markers: Vec<Marker>) {
        let mut state = self.shared.state.lock();
        if state.pending.insert(image.clone(), markers).is_none() {
            state.order.push_back(image.clone());
        } else {
            debug!(image = %image, "pending snapshot superseded before write");
        }
        drop(state);
        self.shared.work.notify_one();
    }

    /// Drain finished write reports. Call from the UI thread.
    pub fn process_results(&self) -> Vec<WriteEvent> {
        let rx = self.results.lock();
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Block until every queued write has settled.
    pub fn flush(&self) {
        let mut state = self.shared.state.lock();
        while !state.is_idle() {
            self.shared.settled.wait(&mut state);
        }
    }

    /// True while `image` has unwritten changes or its last write failed.
    pub fn is_dirty(&self, image: &ImageId) -> bool {
        let state = self.shared.state.lock();
        state.pending.contains_key(image)
            || state.in_flight.as_ref() == Some(image)
            || state.failed.contains(image)
    }

    pub fn has_pending(&self) -> bool {
        !self.shared.state.lock().is_idle()
    }

    pub fn pending_count(&self) -> usize {
        let state = self.shared.state.lock();
        state.pending.len() + usize::from(state.in_flight.is_some())
    }

    /// Timing of completed store writes.
    pub fn write_latency(&self) -> LatencyStats {
        self.shared.state.lock().latency.clone()
    }
}

impl Drop for WriteQueue {
    fn drop(&mut self) {
        self.shared.state.lock().shutdown = true;
        self.shared.work.notify_all();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("marker writer thread panicked");
            }
        }
    }
}

fn run_worker(
    shared: Arc<Shared>,
    store: Arc<dyn MarkerStore>,
    policy: RetryPolicy,
    tx: Sender<WriteEvent>,
) {
    loop {
        let (image, markers) = {
            let mut state = shared.state.lock();
            loop {
                if let Some(job) = state.take_next() {
                    break job;
                }
                if state.shutdown {
                    return;
                }
                shared.work.wait(&mut state);
            }
        };

        let started = Instant::now();
        let event = write_with_retry(&shared, store.as_ref(), &policy, &image, &markers);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        // Report before settling so a flush followed by process_results
        // always sees this event.
        let settled = match &event {
            WriteEvent::Saved { .. } => Some(true),
            WriteEvent::Failed(_) => Some(false),
            WriteEvent::Superseded { .. } => None,
        };
        let _ = tx.send(event);

        {
            let mut state = shared.state.lock();
            state.in_flight = None;
            state.latency.record(elapsed_ms);
            match settled {
                Some(true) => {
                    state.failed.remove(&image);
                }
                Some(false) => {
                    state.failed.insert(image);
                }
                None => {}
            }
        }
        shared.settled.notify_all();
    }
}

fn write_with_retry(
    shared: &Shared,
    store: &dyn MarkerStore,
    policy: &RetryPolicy,
    image: &ImageId,
    markers: &[Marker],
) -> WriteEvent {
    let mut attempt = 1;
    loop {
        match store.save_markers(image, markers) {
            Ok(()) => {
                if attempt > 1 {
                    info!(image = %image, attempt, "marker write succeeded after retry");
                }
                return WriteEvent::Saved {
                    image_id: image.clone(),
                    attempts: attempt,
                };
            }
            Err(error) if attempt >= policy.max_attempts => {
                error!(image = %image, attempts = attempt, "marker write failed: {}", error);
                return WriteEvent::Failed(WriteFailure {
                    image_id: image.clone(),
                    attempts: attempt,
                    error,
                });
            }
            Err(error) => {
                let delay = policy.delay_after(attempt);
                warn!(image = %image, attempt, ?delay, "marker write failed, retrying: {}", error);
                std::thread::sleep(delay);
                if shared.state.lock().pending.contains_key(image) {
                    debug!(image = %image, "newer snapshot queued, dropping stale retry");
                    return WriteEvent::Superseded {
                        image_id: image.clone(),
                    };
                }
                attempt += 1;
            }
        }
    }
}
