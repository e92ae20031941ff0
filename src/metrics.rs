// Run metrics
//
// Counters for one orchestration pass: scan results and remote lookup outcomes

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Lock-free counters shared between the orchestrator and its lookup tasks.
#[derive(Debug)]
pub struct Metrics {
    /// Addon folders parsed successfully
    pub addons_scanned: AtomicUsize,

    /// Categories or addon folders left out of a scan
    pub scan_failures: AtomicUsize,

    /// Manifest lines skipped as malformed
    pub malformed_lines: AtomicUsize,

    /// Remote lookups started
    pub lookups_attempted: AtomicUsize,

    /// Lookups that attached remote info
    pub lookups_attached: AtomicUsize,

    /// Lookups where the catalog had no file for the flavor
    pub lookups_missing: AtomicUsize,

    /// Lookups that failed (network, status, decode)
    pub lookups_failed: AtomicUsize,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            addons_scanned: AtomicUsize::new(0),
            scan_failures: AtomicUsize::new(0),
            malformed_lines: AtomicUsize::new(0),
            lookups_attempted: AtomicUsize::new(0),
            lookups_attached: AtomicUsize::new(0),
            lookups_missing: AtomicUsize::new(0),
            lookups_failed: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_scan(&self, addons: usize, failures: usize, malformed_lines: usize) {
        self.addons_scanned.fetch_add(addons, Ordering::Relaxed);
        self.scan_failures.fetch_add(failures, Ordering::Relaxed);
        self.malformed_lines
            .fetch_add(malformed_lines, Ordering::Relaxed);
    }

    pub fn record_lookup_attempt(&self) {
        self.lookups_attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup_attached(&self) {
        self.lookups_attached.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup_missing(&self) {
        self.lookups_missing.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup_failed(&self) {
        self.lookups_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Share of attempted lookups that attached remote info, 0.0 when none were attempted
    pub fn attach_rate(&self) -> f64 {
        let attempted = self.lookups_attempted.load(Ordering::Relaxed);
        if attempted > 0 {
            self.lookups_attached.load(Ordering::Relaxed) as f64 / attempted as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Run Summary ===");
        tracing::info!("Elapsed: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Scan: {} addons, {} failures, {} malformed manifest lines",
            self.addons_scanned.load(Ordering::Relaxed),
            self.scan_failures.load(Ordering::Relaxed),
            self.malformed_lines.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Lookups: {} attempted, {} attached, {} missing, {} failed ({:.0}% attached)",
            self.lookups_attempted.load(Ordering::Relaxed),
            self.lookups_attached.load(Ordering::Relaxed),
            self.lookups_missing.load(Ordering::Relaxed),
            self.lookups_failed.load(Ordering::Relaxed),
            self.attach_rate() * 100.0
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
