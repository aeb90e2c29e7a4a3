//! Prometheus metrics for monitoring.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Metrics collector.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Total requests processed
    pub requests_total: AtomicU64,
    /// Successful requests
    pub requests_success: AtomicU64,
    /// Failed requests
    pub requests_failed: AtomicU64,
    /// Projects created
    pub projects_created: AtomicU64,
    /// Archive replacements
    pub archives_updated: AtomicU64,
    /// Archives served to callers
    pub archives_served: AtomicU64,
    /// Bytes written to the blob store
    pub bytes_stored: AtomicU64,
    /// Metadata/blob mismatches detected
    pub inconsistencies: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record a finished request.
    pub fn record_request(&self, success: bool) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        if success {
            self.requests_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a created project and its stored bytes.
    pub fn inc_created(&self, bytes: usize) {
        self.projects_created.fetch_add(1, Ordering::Relaxed);
        self.bytes_stored.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record a replaced archive and its stored bytes.
    pub fn inc_updated(&self, bytes: usize) {
        self.archives_updated.fetch_add(1, Ordering::Relaxed);
        self.bytes_stored.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Increment archives served.
    pub fn inc_served(&self) {
        self.archives_served.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment detected inconsistencies.
    pub fn inc_inconsistencies(&self) {
        self.inconsistencies.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            projects_created: self.projects_created.load(Ordering::Relaxed),
            archives_updated: self.archives_updated.load(Ordering::Relaxed),
            archives_served: self.archives_served.load(Ordering::Relaxed),
            bytes_stored: self.bytes_stored.load(Ordering::Relaxed),
            inconsistencies: self.inconsistencies.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        let s = self.snapshot();
        format!(
            r#"# HELP artifact_store_requests_total Total number of requests
# TYPE artifact_store_requests_total counter
artifact_store_requests_total {}

# HELP artifact_store_requests_success Successful requests
# TYPE artifact_store_requests_success counter
artifact_store_requests_success {}

# HELP artifact_store_requests_failed Failed requests
# TYPE artifact_store_requests_failed counter
artifact_store_requests_failed {}

# HELP artifact_store_projects_created Projects created
# TYPE artifact_store_projects_created counter
artifact_store_projects_created {}

# HELP artifact_store_archives_updated Archive replacements
# TYPE artifact_store_archives_updated counter
artifact_store_archives_updated {}

# HELP artifact_store_archives_served Archives served
# TYPE artifact_store_archives_served counter
artifact_store_archives_served {}

# HELP artifact_store_bytes_stored Bytes written to blob storage
# TYPE artifact_store_bytes_stored counter
artifact_store_bytes_stored {}

# HELP artifact_store_inconsistencies Metadata and blob mismatches detected
# TYPE artifact_store_inconsistencies counter
artifact_store_inconsistencies {}
"#,
            s.requests_total,
            s.requests_success,
            s.requests_failed,
            s.projects_created,
            s.archives_updated,
            s.archives_served,
            s.bytes_stored,
            s.inconsistencies
        )
    }
}

/// Metrics snapshot.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub requests_success: u64,
    pub requests_failed: u64,
    pub projects_created: u64,
    pub archives_updated: u64,
    pub archives_served: u64,
    pub bytes_stored: u64,
    pub inconsistencies: u64,
}

/// Timer for measuring durations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
