//! Performance instrumentation for input handlers and storage writes.
//!
//! Gesture handling runs on the UI thread for every pointer event, so slow
//! handlers show up as input lag. With the `profiling` feature enabled,
//! [`profile_scope!`] wraps a block in a [`ScopedTimer`] that warns when the
//! block exceeds its budget. Without the feature the macro compiles away.
//!
//! ```ignore
//! use occlude::profile_scope;
//!
//! fn pointer_move() {
//!     profile_scope!("pointer_move");
//!     // ... routing ...
//! }
//! ```

use std::collections::VecDeque;
use std::time::Instant;
use tracing::{trace, warn};

/// Default budget for one input handler, in milliseconds (a quarter frame at 60 FPS)
pub const DEFAULT_BUDGET_MS: f64 = 4.0;

/// Number of samples kept by [`LatencyStats`]
const SAMPLE_COUNT: usize = 100;

/// Profile a scope with the given name. Zero-cost when profiling is disabled.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::new($name, $crate::perf::DEFAULT_BUDGET_MS);
        #[cfg(not(feature = "profiling"))]
        let _ = $name;
    };
    ($name:expr, $budget_ms:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::new($name, $budget_ms);
        #[cfg(not(feature = "profiling"))]
        let _ = ($name, $budget_ms);
    };
}

pub use crate::profile_scope;

/// RAII timer: logs on drop, warning when the scope ran over budget.
pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
    budget_ms: f64,
}

impl ScopedTimer {
    pub fn new(name: &'static str, budget_ms: f64) -> Self {
        Self {
            name,
            start: Instant::now(),
            budget_ms,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let ms = self.elapsed_ms();
        if ms > self.budget_ms {
            warn!(
                operation = self.name,
                elapsed_ms = format!("{:.2}", ms),
                budget_ms = format!("{:.2}", self.budget_ms),
                "Slow input handler"
            );
        } else {
            trace!(operation = self.name, elapsed_ms = ms, "handler timing");
        }
    }
}

/// Rolling latency samples for one operation.
#[derive(Debug, Clone, Default)]
pub struct LatencyStats {
    samples: VecDeque<f64>,
    count: u64,
    max_ms: f64,
}

impl LatencyStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, ms: f64) {
        if self.samples.len() >= SAMPLE_COUNT {
            self.samples.pop_front();
        }
        self.samples.push_back(ms);
        self.count += 1;
        self.max_ms = self.max_ms.max(ms);
    }

    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.samples.iter().sum::<f64>() / self.samples.len() as f64
        }
    }

    pub fn max(&self) -> f64 {
        self.max_ms
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}
