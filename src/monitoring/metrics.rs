//! Pipeline metrics
//!
//! Tracks analysis throughput and latency for the status endpoint. All
//! mutable state sits under a single `RwLock` so the hot path takes one
//! lock at most; plain counters are lock-free atomics.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Inner mutable state protected by a single lock
struct MetricsInner {
    /// Rolling latency window
    latencies: VecDeque<f64>,
}

/// Counters and latency window for the analysis pipeline.
pub struct PipelineMetrics {
    /// Window size for rolling latency stats
    window_size: usize,

    inner: RwLock<MetricsInner>,

    // Lock-free counters
    total_analyses: AtomicU64,
    total_failures: AtomicU64,
    rows_scored: AtomicU64,
    fraud_flagged: AtomicU64,

    start_time: Instant,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl PipelineMetrics {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            inner: RwLock::new(MetricsInner {
                latencies: VecDeque::with_capacity(window_size),
            }),
            total_analyses: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
            rows_scored: AtomicU64::new(0),
            fraud_flagged: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one completed analysis.
    pub fn record_analysis(&self, rows: u64, flagged: u64, latency_ms: f64) {
        self.total_analyses.fetch_add(1, Ordering::Relaxed);
        self.rows_scored.fetch_add(rows, Ordering::Relaxed);
        self.fraud_flagged.fetch_add(flagged, Ordering::Relaxed);

        if let Ok(mut inner) = self.inner.write() {
            inner.latencies.push_back(latency_ms);
            if inner.latencies.len() > self.window_size {
                inner.latencies.pop_front();
            }
        }
    }

    /// Record an analysis that errored before producing metrics.
    pub fn record_failure(&self) {
        self.total_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_latency(&self) -> f64 {
        self.inner
            .read()
            .map(|inner| {
                if inner.latencies.is_empty() {
                    0.0
                } else {
                    inner.latencies.iter().sum::<f64>() / inner.latencies.len() as f64
                }
            })
            .unwrap_or(0.0)
    }

    pub fn max_latency(&self) -> f64 {
        self.inner
            .read()
            .map(|inner| inner.latencies.iter().copied().fold(0.0, f64::max))
            .unwrap_or(0.0)
    }

    /// Percentile over the rolling window via quickselect.
    pub fn percentile_latency(&self, percentile: f64) -> f64 {
        self.inner
            .read()
            .map(|inner| {
                if inner.latencies.is_empty() {
                    return 0.0;
                }

                let mut window: Vec<f64> = inner.latencies.iter().copied().collect();
                let idx = (((percentile / 100.0) * (window.len() - 1) as f64) as usize)
                    .min(window.len() - 1);
                window.select_nth_unstable_by(idx, |a, b| {
                    a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
                });
                window[idx]
            })
            .unwrap_or(0.0)
    }

    pub fn p95_latency(&self) -> f64 {
        self.percentile_latency(95.0)
    }

    pub fn failure_rate(&self) -> f64 {
        let analyses = self.total_analyses.load(Ordering::Relaxed);
        let failures = self.total_failures.load(Ordering::Relaxed);
        let attempts = analyses + failures;

        if attempts > 0 {
            failures as f64 / attempts as f64
        } else {
            0.0
        }
    }

    pub fn total_analyses(&self) -> u64 {
        self.total_analyses.load(Ordering::Relaxed)
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures.load(Ordering::Relaxed)
    }

    pub fn rows_scored(&self) -> u64 {
        self.rows_scored.load(Ordering::Relaxed)
    }

    pub fn fraud_flagged(&self) -> u64 {
        self.fraud_flagged.load(Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Point-in-time view for the status endpoint.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_analyses: self.total_analyses(),
            total_failures: self.total_failures(),
            rows_scored: self.rows_scored(),
            fraud_flagged: self.fraud_flagged(),
            failure_rate: self.failure_rate(),
            avg_latency_ms: self.avg_latency(),
            p95_latency_ms: self.p95_latency(),
            max_latency_ms: self.max_latency(),
        }
    }
}

/// Serializable snapshot of [`PipelineMetrics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_analyses: u64,
    pub total_failures: u64,
    pub rows_scored: u64,
    pub fraud_flagged: u64,
    pub failure_rate: f64,
    pub avg_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub max_latency_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_analysis_updates_counters() {
        let metrics = PipelineMetrics::new(10);
        metrics.record_analysis(100, 3, 12.5);
        metrics.record_analysis(50, 0, 7.5);

        assert_eq!(metrics.total_analyses(), 2);
        assert_eq!(metrics.rows_scored(), 150);
        assert_eq!(metrics.fraud_flagged(), 3);
        assert!((metrics.avg_latency() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_failure_rate() {
        let metrics = PipelineMetrics::new(10);
        assert_eq!(metrics.failure_rate(), 0.0);

        metrics.record_analysis(10, 0, 1.0);
        metrics.record_failure();
        assert!((metrics.failure_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_latency_window_is_bounded() {
        let metrics = PipelineMetrics::new(3);
        for ms in [1.0, 2.0, 3.0, 100.0] {
            metrics.record_analysis(1, 0, ms);
        }
        // first observation fell out of the window
        assert!((metrics.avg_latency() - 35.0).abs() < 1e-12);
        assert_eq!(metrics.max_latency(), 100.0);
    }

    #[test]
    fn test_percentile() {
        let metrics = PipelineMetrics::new(100);
        for ms in 1..=100 {
            metrics.record_analysis(1, 0, ms as f64);
        }
        let p95 = metrics.p95_latency();
        assert!(p95 >= 94.0 && p95 <= 96.0, "p95 was {p95}");
    }

    #[test]
    fn test_summary_serializes() {
        let metrics = PipelineMetrics::new(10);
        metrics.record_analysis(5, 1, 2.0);
        let summary = metrics.summary();
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["total_analyses"], 1);
        assert_eq!(value["fraud_flagged"], 1);
    }
}
