//! Observability stubs (metrics, tracing)

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    jobs_saved: AtomicU64,
    jobs_deleted: AtomicU64,
    cache_refreshes: AtomicU64,
    compensations_recorded: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_saved(&self) {
        self.jobs_saved.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "jobs_saved", "Metric incremented");
    }

    pub fn jobs_saved(&self, count: u64) {
        self.jobs_saved.fetch_add(count, Ordering::Relaxed);
        tracing::debug!(counter = "jobs_saved", count, "Metric incremented");
    }

    pub fn job_deleted(&self) {
        self.jobs_deleted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "jobs_deleted", "Metric incremented");
    }

    pub fn cache_refreshed(&self) {
        self.cache_refreshes.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "cache_refreshes", "Metric incremented");
    }

    pub fn compensation_recorded(&self) {
        self.compensations_recorded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "compensations_recorded", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_saved: self.jobs_saved.load(Ordering::Relaxed),
            jobs_deleted: self.jobs_deleted.load(Ordering::Relaxed),
            cache_refreshes: self.cache_refreshes.load(Ordering::Relaxed),
            compensations_recorded: self.compensations_recorded.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub jobs_saved: u64,
    pub jobs_deleted: u64,
    pub cache_refreshes: u64,
    pub compensations_recorded: u64,
}
