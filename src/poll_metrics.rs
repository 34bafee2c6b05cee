use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Global poll metrics instance
pub static POLL_METRICS: Lazy<Mutex<PollMetrics>> = Lazy::new(|| Mutex::new(PollMetrics::new()));

/// Counters for the feed polling loop
#[derive(Debug, Default)]
pub struct PollMetrics {
    pub polls_attempted: u64,
    pub polls_successful: u64,
    pub polls_failed: u64,
    pub samples_received: u64,
    pub range_violations: u64,
    pub last_poll_duration: Option<Duration>,
    pub start_time: Option<Instant>,
}

impl PollMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn record_attempt(&mut self) {
        self.polls_attempted += 1;
    }

    pub fn record_success(&mut self, samples: u64, duration: Duration) {
        self.polls_successful += 1;
        self.samples_received += samples;
        self.last_poll_duration = Some(duration);
    }

    pub fn record_failure(&mut self, duration: Duration) {
        self.polls_failed += 1;
        self.last_poll_duration = Some(duration);
    }

    pub fn record_range_violations(&mut self, count: u64) {
        self.range_violations += count;
    }

    pub fn get_total_duration(&self) -> Duration {
        self.start_time
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    /// Share of polls that returned a decodable feed.
    pub fn success_ratio(&self) -> f64 {
        if self.polls_attempted > 0 {
            self.polls_successful as f64 / self.polls_attempted as f64
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![
            "========== Poll Metrics Summary ==========".to_string(),
            format!("Total Duration: {:.2?}", self.get_total_duration()),
            format!("Polls Attempted: {}", self.polls_attempted),
            format!("Polls Successful: {}", self.polls_successful),
            format!("Polls Failed: {}", self.polls_failed),
            format!("Samples Received: {}", self.samples_received),
            format!("Range Violations: {}", self.range_violations),
            format!("Success Ratio: {:.1}%", self.success_ratio() * 100.0),
        ];
        if let Some(last) = self.last_poll_duration {
            lines.push(format!("Last Poll: {:.2?}", last));
        }
        lines.push("==========================================".to_string());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut metrics = PollMetrics::new();
        metrics.record_attempt();
        metrics.record_success(50, Duration::from_millis(120));
        metrics.record_attempt();
        metrics.record_failure(Duration::from_millis(900));
        metrics.record_range_violations(2);

        assert_eq!(metrics.polls_attempted, 2);
        assert_eq!(metrics.polls_successful, 1);
        assert_eq!(metrics.polls_failed, 1);
        assert_eq!(metrics.samples_received, 50);
        assert_eq!(metrics.last_poll_duration, Some(Duration::from_millis(900)));
        assert_eq!(metrics.success_ratio(), 0.5);

        let summary = metrics.summary();
        assert!(summary.contains("Polls Attempted: 2"));
        assert!(summary.contains("Range Violations: 2"));
        assert!(summary.contains("Success Ratio: 50.0%"));
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = PollMetrics::default();
        assert_eq!(metrics.success_ratio(), 0.0);
        assert_eq!(metrics.get_total_duration(), Duration::ZERO);
        assert!(!metrics.summary().contains("Last Poll"));
    }
}
