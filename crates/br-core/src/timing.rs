//! Lightweight performance timing utilities.
//!
//! Enabled through the `BR_TIMING` environment variable or programmatically.
//! Disabled timers cost one `Instant::now()` and report nothing.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable performance timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("BR_TIMING").is_ok()
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    label: &'static str,
    start: Instant,
    enabled: bool,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }

    /// Elapsed wall time in seconds, whether or not timing output is enabled.
    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Stop the timer and return elapsed time in seconds.
    /// If timing is disabled, returns None.
    pub fn stop(self) -> Option<f64> {
        if self.enabled {
            Some(self.start.elapsed().as_secs_f64())
        } else {
            None
        }
    }

    /// Stop the timer and print the result if enabled.
    pub fn stop_and_print(self) {
        let label = self.label;
        if let Some(elapsed) = self.stop() {
            println!("[TIMING] {}: {:.3}s", label, elapsed);
        }
    }
}

/// Accumulating timer for tracking total time across multiple calls.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total time spent (in seconds).
    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1e9
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Get average time per call (in seconds).
    pub fn average_seconds(&self) -> f64 {
        let count = self.count();
        if count > 0 {
            self.total_seconds() / count as f64
        } else {
            0.0
        }
    }

    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Flowsheet and TEA timers.
pub mod sim_timing {
    use super::AccumulatingTimer;

    /// Time spent executing individual unit operations
    pub static UNIT_RUNS: AccumulatingTimer = AccumulatingTimer::new();
    /// Time spent in full recycle passes
    pub static RECYCLE_PASSES: AccumulatingTimer = AccumulatingTimer::new();
    /// Time spent evaluating NPV during price solving
    pub static NPV_EVALUATIONS: AccumulatingTimer = AccumulatingTimer::new();

    pub fn reset_all() {
        UNIT_RUNS.reset();
        RECYCLE_PASSES.reset();
        NPV_EVALUATIONS.reset();
    }

    /// Print the accumulated breakdown when timing is enabled.
    pub fn print_summary() {
        use super::is_enabled;
        if !is_enabled() {
            return;
        }

        println!("\n=== Simulation Breakdown ===");
        for (label, timer) in [
            ("unit runs", &UNIT_RUNS),
            ("recycle passes", &RECYCLE_PASSES),
            ("NPV evaluations", &NPV_EVALUATIONS),
        ] {
            let count = timer.count();
            if count > 0 {
                println!(
                    "{:<18} {} calls, {:.3}s total, {:.4}ms avg",
                    label,
                    count,
                    timer.total_seconds(),
                    timer.average_seconds() * 1000.0
                );
            }
        }
        println!("============================\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulating_timer_averages() {
        let timer = AccumulatingTimer::new();
        assert_eq!(timer.average_seconds(), 0.0);
        timer.record(0.5);
        timer.record(1.5);
        assert_eq!(timer.count(), 2);
        assert!((timer.total_seconds() - 2.0).abs() < 1e-6);
        assert!((timer.average_seconds() - 1.0).abs() < 1e-6);
        timer.reset();
        assert_eq!(timer.count(), 0);
    }
}
