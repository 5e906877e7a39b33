//! Performance metrics and statistics tracking for the scoring pipeline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for scoring performance
pub struct PipelineMetrics {
    /// Total applications scored
    pub applications_scored: AtomicU64,
    /// Applications predicted to default (label 1)
    pub defaults_flagged: AtomicU64,
    /// Malformed records rejected per-request
    pub records_rejected: AtomicU64,
    /// Decisions by risk level
    decisions_by_level: RwLock<HashMap<String, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Default probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PipelineMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            applications_scored: AtomicU64::new(0),
            defaults_flagged: AtomicU64::new(0),
            records_rejected: AtomicU64::new(0),
            decisions_by_level: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a scored application
    pub fn record_scored(&self, processing_time: Duration, probability_of_default: f64, label: u8) {
        self.applications_scored.fetch_add(1, Ordering::Relaxed);
        if label == 1 {
            self.defaults_flagged.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the recent window for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (probability_of_default * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a decision by risk level
    pub fn record_decision(&self, risk_level: &str) {
        if let Ok(mut by_level) = self.decisions_by_level.write() {
            *by_level.entry(risk_level.to_string()).or_insert(0) += 1;
        }
    }

    /// Record a rejected (malformed) record
    pub fn record_rejected(&self) {
        self.records_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (applications per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.applications_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get default probability distribution
    pub fn get_probability_distribution(&self) -> [u64; 10] {
        *self.probability_buckets.read().unwrap()
    }

    /// Get decisions by risk level
    pub fn get_decisions_by_level(&self) -> HashMap<String, u64> {
        self.decisions_by_level.read().unwrap().clone()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let scored = self.applications_scored.load(Ordering::Relaxed);
        let flagged = self.defaults_flagged.load(Ordering::Relaxed);
        let rejected = self.records_rejected.load(Ordering::Relaxed);
        let default_rate = if scored > 0 {
            (flagged as f64 / scored as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let by_level = self.get_decisions_by_level();
        let distribution = self.get_probability_distribution();

        info!("=== LOAN RISK PIPELINE - METRICS SUMMARY ===");
        info!(
            scored = scored,
            flagged = flagged,
            rejected = rejected,
            default_rate = format!("{:.1}%", default_rate),
            throughput = format!("{:.1} app/s", throughput),
            "Totals"
        );
        info!(
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            "Processing time"
        );
        for (level, count) in &by_level {
            let pct = if scored > 0 {
                (*count as f64 / scored as f64) * 100.0
            } else {
                0.0
            };
            info!(level = %level, count = count, pct = format!("{:.1}%", pct), "Decisions");
        }
        let total: u64 = distribution.iter().sum();
        for (i, &count) in distribution.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let pct = if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            info!(
                bucket = format!("{:.1}-{:.1}", i as f64 / 10.0, (i + 1) as f64 / 10.0),
                count = count,
                pct = format!("{:.1}%", pct),
                "Probability distribution"
            );
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<PipelineMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<PipelineMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = PipelineMetrics::new();

        metrics.record_scored(Duration::from_micros(100), 0.2, 0);
        metrics.record_scored(Duration::from_micros(200), 0.8, 1);
        metrics.record_decision("high");
        metrics.record_decision("low");
        metrics.record_rejected();

        assert_eq!(metrics.applications_scored.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.defaults_flagged.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.records_rejected.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.get_decisions_by_level().len(), 2);
    }

    #[test]
    fn test_probability_distribution_buckets() {
        let metrics = PipelineMetrics::new();

        metrics.record_scored(Duration::from_micros(100), 0.05, 0);
        metrics.record_scored(Duration::from_micros(100), 0.95, 1);
        metrics.record_scored(Duration::from_micros(100), 1.0, 1);

        let distribution = metrics.get_probability_distribution();
        assert_eq!(distribution[0], 1);
        assert_eq!(distribution[9], 2);
    }
}
