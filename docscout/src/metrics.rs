use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Counters shared by every worker of a search session.
///
/// Clones share the same counters, so a clone can be moved into each file task.
#[derive(Debug, Clone)]
pub struct SearchMetrics {
    // File-level progress
    files_completed: Arc<AtomicU64>,
    files_failed: Arc<AtomicU64>,
    bytes_read: Arc<AtomicU64>,

    // Unit-level work
    cells_scanned: Arc<AtomicU64>,
    lines_scanned: Arc<AtomicU64>,
    results_emitted: Arc<AtomicU64>,

    // Regex compilation cache
    cache_hits: Arc<AtomicU64>,
    cache_misses: Arc<AtomicU64>,
}

impl SearchMetrics {
    /// Creates a new SearchMetrics instance
    pub fn new() -> Self {
        Self {
            files_completed: Arc::new(AtomicU64::new(0)),
            files_failed: Arc::new(AtomicU64::new(0)),
            bytes_read: Arc::new(AtomicU64::new(0)),
            cells_scanned: Arc::new(AtomicU64::new(0)),
            lines_scanned: Arc::new(AtomicU64::new(0)),
            results_emitted: Arc::new(AtomicU64::new(0)),
            cache_hits: Arc::new(AtomicU64::new(0)),
            cache_misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a finished file and returns how many files this instance has seen finish
    pub fn record_file_completed(&self, bytes: u64, failed: bool) -> u64 {
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
        if failed {
            self.files_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.files_completed.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn record_cells(&self, count: u64) {
        self.cells_scanned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_lines(&self, count: u64) {
        self.lines_scanned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_results(&self, count: u64) {
        self.results_emitted.fetch_add(count, Ordering::Relaxed);
    }

    /// Records a lookup in the compiled pattern cache
    pub fn record_cache_lookup(&self, hit: bool) {
        if hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn files_completed(&self) -> u64 {
        self.files_completed.load(Ordering::Acquire)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Gets the current counter values
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            files_completed: self.files_completed.load(Ordering::Acquire),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            cells_scanned: self.cells_scanned.load(Ordering::Relaxed),
            lines_scanned: self.lines_scanned.load(Ordering::Relaxed),
            results_emitted: self.results_emitted.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }

    /// Logs current counter values
    pub fn log_stats(&self) {
        let stats = self.snapshot();
        info!(
            "Search stats:\n\
             Files completed/failed: {}/{}\n\
             Bytes read: {}\n\
             Cells/lines scanned: {}/{}\n\
             Results emitted: {}\n\
             Pattern cache hits/misses: {}/{}",
            stats.files_completed,
            stats.files_failed,
            stats.bytes_read,
            stats.cells_scanned,
            stats.lines_scanned,
            stats.results_emitted,
            stats.cache_hits,
            stats.cache_misses
        );
    }
}

impl Default for SearchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`SearchMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub files_completed: u64,
    pub files_failed: u64,
    pub bytes_read: u64,
    pub cells_scanned: u64,
    pub lines_scanned: u64,
    pub results_emitted: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_file_completion_is_a_running_total() {
        let metrics = SearchMetrics::new();

        assert_eq!(metrics.record_file_completed(100, false), 1);
        assert_eq!(metrics.record_file_completed(50, true), 2);

        let stats = metrics.snapshot();
        assert_eq!(stats.files_completed, 2);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.bytes_read, 150);
    }

    #[test]
    fn test_concurrent_completion_counts_every_file() {
        let metrics = SearchMetrics::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        metrics.record_file_completed(1, false);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.files_completed(), 800);
        assert_eq!(metrics.snapshot().bytes_read, 800);
    }

    #[test]
    fn test_unit_counters() {
        let metrics = SearchMetrics::new();
        metrics.record_cells(12);
        metrics.record_lines(30);
        metrics.record_results(4);

        let stats = metrics.snapshot();
        assert_eq!(stats.cells_scanned, 12);
        assert_eq!(stats.lines_scanned, 30);
        assert_eq!(stats.results_emitted, 4);
    }

    #[test]
    fn test_cache_metrics() {
        let metrics = SearchMetrics::new();
        metrics.record_cache_lookup(false);
        metrics.record_cache_lookup(true);
        metrics.record_cache_lookup(true);

        assert_eq!(metrics.cache_hits(), 2);
        assert_eq!(metrics.cache_misses(), 1);
    }
}
