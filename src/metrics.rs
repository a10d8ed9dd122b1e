//! Listener activity counters.
//!
//! Tracks the handful of quote-ingestion counters the listener and the
//! CLI entrypoint actually report: accepted/rejected quotes and parse
//! errors. Shared across tasks behind an `Arc` and updated with relaxed
//! atomics, since these are advisory counts, not synchronization points.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for tracking quote listener activity.
#[derive(Debug, Default)]
pub struct ClientStats {
    /// Total quote events received from the listener.
    pub quotes_received: AtomicU64,
    /// Total quote events rejected by the store (crossed market, bad symbol).
    pub quotes_rejected: AtomicU64,
    /// Total frame parse errors.
    pub parse_errors: AtomicU64,
}

impl ClientStats {
    /// Create new client statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment quotes received counter.
    #[inline]
    pub fn inc_quotes_received(&self, count: u64) {
        self.quotes_received.fetch_add(count, Ordering::Relaxed);
    }

    /// Increment quotes rejected counter.
    #[inline]
    pub fn inc_quotes_rejected(&self, count: u64) {
        self.quotes_rejected.fetch_add(count, Ordering::Relaxed);
    }

    /// Increment parse errors counter.
    #[inline]
    pub fn inc_parse_errors(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current snapshot of all statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            quotes_received: self.quotes_received.load(Ordering::Relaxed),
            quotes_rejected: self.quotes_rejected.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.quotes_received.store(0, Ordering::Relaxed);
        self.quotes_rejected.store(0, Ordering::Relaxed);
        self.parse_errors.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time snapshot of client statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsSnapshot {
    /// Total quote events received.
    pub quotes_received: u64,
    /// Total quote events rejected.
    pub quotes_rejected: u64,
    /// Total parse errors.
    pub parse_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_client_stats() {
        let stats = ClientStats::new();
        stats.inc_quotes_received(10);
        stats.inc_quotes_rejected(2);
        stats.inc_parse_errors();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.quotes_received, 10);
        assert_eq!(snapshot.quotes_rejected, 2);
        assert_eq!(snapshot.parse_errors, 1);
    }

    #[test]
    fn test_client_stats_reset() {
        let stats = ClientStats::new();
        stats.inc_quotes_received(100);

        stats.reset();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.quotes_received, 0);
    }

    #[test]
    fn test_stats_snapshot_default() {
        let snapshot = StatsSnapshot::default();
        assert_eq!(snapshot.quotes_received, 0);
        assert_eq!(snapshot.quotes_rejected, 0);
    }

    #[test]
    fn test_client_stats_thread_safe() {
        let stats = Arc::new(ClientStats::new());
        let stats2 = stats.clone();

        let handle = std::thread::spawn(move || {
            for _ in 0..1000 {
                stats2.inc_quotes_received(1);
            }
        });

        for _ in 0..1000 {
            stats.inc_quotes_received(1);
        }

        handle.join().unwrap();
        assert_eq!(stats.snapshot().quotes_received, 2000);
    }
}
