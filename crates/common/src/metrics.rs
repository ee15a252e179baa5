//! Metrics collection for sharegraph.
//!
//! Counters are plain atomics held behind an `Arc<Metrics>` that the HTTP layer
//! owns and passes around explicitly.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Application metrics collector.
#[derive(Debug)]
pub struct Metrics {
    // === Request Metrics ===
    /// Total HTTP requests received
    pub http_requests_total: AtomicU64,
    /// Active HTTP requests
    pub http_requests_active: AtomicU64,
    /// HTTP requests by status code category (2xx, 4xx, 5xx)
    pub http_requests_2xx: AtomicU64,
    pub http_requests_4xx: AtomicU64,
    pub http_requests_5xx: AtomicU64,
    /// Total request latency in microseconds
    pub http_request_latency_us_total: AtomicU64,

    // === Graph Metrics ===
    /// Follow edges created by explicit follow calls
    pub follows_created: AtomicU64,
    /// Friend requests sent
    pub friend_requests_sent: AtomicU64,
    /// Friend requests accepted
    pub friend_requests_accepted: AtomicU64,
    /// Friendships removed
    pub unfriends: AtomicU64,

    // === Recommendation Metrics ===
    /// Recommendation lists served
    pub recommendations_served: AtomicU64,
    /// Recommendation lists that include popularity fallback entries
    pub recommendation_fallbacks: AtomicU64,
}

impl Metrics {
    /// Create a new metrics instance with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            http_requests_total: AtomicU64::new(0),
            http_requests_active: AtomicU64::new(0),
            http_requests_2xx: AtomicU64::new(0),
            http_requests_4xx: AtomicU64::new(0),
            http_requests_5xx: AtomicU64::new(0),
            http_request_latency_us_total: AtomicU64::new(0),

            follows_created: AtomicU64::new(0),
            friend_requests_sent: AtomicU64::new(0),
            friend_requests_accepted: AtomicU64::new(0),
            unfriends: AtomicU64::new(0),

            recommendations_served: AtomicU64::new(0),
            recommendation_fallbacks: AtomicU64::new(0),
        }
    }

    /// Record a completed HTTP request.
    pub fn record_http_request(&self, status_code: u16, latency: Duration) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);

        match status_code {
            200..=299 => self.http_requests_2xx.fetch_add(1, Ordering::Relaxed),
            400..=499 => self.http_requests_4xx.fetch_add(1, Ordering::Relaxed),
            500..=599 => self.http_requests_5xx.fetch_add(1, Ordering::Relaxed),
            _ => 0,
        };

        self.http_request_latency_us_total
            .fetch_add(latency.as_micros() as u64, Ordering::Relaxed);
    }

    /// Start tracking an active request.
    pub fn start_request(&self) {
        self.http_requests_active.fetch_add(1, Ordering::Relaxed);
    }

    /// End tracking an active request.
    pub fn end_request(&self) {
        self.http_requests_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record a newly created follow edge.
    pub fn record_follow_created(&self) {
        self.follows_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a sent friend request.
    pub fn record_friend_request_sent(&self) {
        self.friend_requests_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an accepted friend request.
    pub fn record_friend_request_accepted(&self) {
        self.friend_requests_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a removed friendship.
    pub fn record_unfriend(&self) {
        self.unfriends.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a served recommendation list.
    pub fn record_recommendation(&self, used_fallback: bool) {
        self.recommendations_served.fetch_add(1, Ordering::Relaxed);
        if used_fallback {
            self.recommendation_fallbacks.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get a snapshot of all metrics.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            http_requests_total: self.http_requests_total.load(Ordering::Relaxed),
            http_requests_active: self.http_requests_active.load(Ordering::Relaxed),
            http_requests_2xx: self.http_requests_2xx.load(Ordering::Relaxed),
            http_requests_4xx: self.http_requests_4xx.load(Ordering::Relaxed),
            http_requests_5xx: self.http_requests_5xx.load(Ordering::Relaxed),
            http_request_latency_avg_us: self.average_latency_us(),

            follows_created: self.follows_created.load(Ordering::Relaxed),
            friend_requests_sent: self.friend_requests_sent.load(Ordering::Relaxed),
            friend_requests_accepted: self.friend_requests_accepted.load(Ordering::Relaxed),
            unfriends: self.unfriends.load(Ordering::Relaxed),

            recommendations_served: self.recommendations_served.load(Ordering::Relaxed),
            recommendation_fallbacks: self.recommendation_fallbacks.load(Ordering::Relaxed),
        }
    }

    /// Calculate average HTTP request latency.
    fn average_latency_us(&self) -> u64 {
        let total = self.http_request_latency_us_total.load(Ordering::Relaxed);
        let count = self.http_requests_total.load(Ordering::Relaxed);
        if count > 0 { total / count } else { 0 }
    }

    /// Export metrics in Prometheus format.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let s = self.snapshot();
        let mut output = String::new();

        write_metric(&mut output, "http_requests_total", "counter", "Total HTTP requests", s.http_requests_total);
        write_metric(&mut output, "http_requests_active", "gauge", "Active HTTP requests", s.http_requests_active);

        output.push_str("# HELP sharegraph_http_requests_by_status HTTP requests by status\n");
        output.push_str("# TYPE sharegraph_http_requests_by_status counter\n");
        for (class, value) in [
            ("2xx", s.http_requests_2xx),
            ("4xx", s.http_requests_4xx),
            ("5xx", s.http_requests_5xx),
        ] {
            let _ = writeln!(
                output,
                "sharegraph_http_requests_by_status{{status=\"{class}\"}} {value}"
            );
        }

        write_metric(&mut output, "http_request_latency_avg_us", "gauge", "Average request latency", s.http_request_latency_avg_us);
        write_metric(&mut output, "follows_created", "counter", "Follow edges created", s.follows_created);
        write_metric(&mut output, "friend_requests_sent", "counter", "Friend requests sent", s.friend_requests_sent);
        write_metric(&mut output, "friend_requests_accepted", "counter", "Friend requests accepted", s.friend_requests_accepted);
        write_metric(&mut output, "unfriends", "counter", "Friendships removed", s.unfriends);
        write_metric(&mut output, "recommendations_served", "counter", "Recommendation lists served", s.recommendations_served);
        write_metric(&mut output, "recommendation_fallbacks", "counter", "Recommendation lists with fallback entries", s.recommendation_fallbacks);

        output
    }
}

fn write_metric(output: &mut String, name: &str, kind: &str, help: &str, value: u64) {
    let _ = writeln!(output, "# HELP sharegraph_{name} {help}");
    let _ = writeln!(output, "# TYPE sharegraph_{name} {kind}");
    let _ = writeln!(output, "sharegraph_{name} {value}");
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of all metrics at a point in time.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSnapshot {
    // HTTP
    pub http_requests_total: u64,
    pub http_requests_active: u64,
    pub http_requests_2xx: u64,
    pub http_requests_4xx: u64,
    pub http_requests_5xx: u64,
    pub http_request_latency_avg_us: u64,

    // Graph
    pub follows_created: u64,
    pub friend_requests_sent: u64,
    pub friend_requests_accepted: u64,
    pub unfriends: u64,

    // Recommendations
    pub recommendations_served: u64,
    pub recommendation_fallbacks: u64,
}

/// Timer guard for measuring operation duration.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration since timer start.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_http_request() {
        let metrics = Metrics::new();

        metrics.record_http_request(200, Duration::from_millis(50));
        metrics.record_http_request(404, Duration::from_millis(10));
        metrics.record_http_request(500, Duration::from_millis(100));

        assert_eq!(metrics.http_requests_total.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.http_requests_2xx.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.http_requests_4xx.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.http_requests_5xx.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_active_request_tracking() {
        let metrics = Metrics::new();

        metrics.start_request();
        metrics.start_request();
        assert_eq!(metrics.http_requests_active.load(Ordering::Relaxed), 2);

        metrics.end_request();
        assert_eq!(metrics.http_requests_active.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_record_recommendation() {
        let metrics = Metrics::new();

        metrics.record_recommendation(false);
        metrics.record_recommendation(true);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.recommendations_served, 2);
        assert_eq!(snapshot.recommendation_fallbacks, 1);
    }

    #[test]
    fn test_average_latency() {
        let metrics = Metrics::new();
        assert_eq!(metrics.average_latency_us(), 0);

        metrics.record_http_request(200, Duration::from_micros(100));
        metrics.record_http_request(200, Duration::from_micros(200));
        assert_eq!(metrics.average_latency_us(), 150);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = Metrics::new();
        metrics.record_http_request(200, Duration::from_millis(50));
        metrics.friend_requests_accepted.fetch_add(3, Ordering::Relaxed);

        let prometheus = metrics.to_prometheus();
        assert!(prometheus.contains("sharegraph_http_requests_total 1"));
        assert!(prometheus.contains("sharegraph_http_requests_by_status{status=\"2xx\"} 1"));
        assert!(prometheus.contains("sharegraph_friend_requests_accepted 3"));
        assert!(prometheus.contains("# TYPE sharegraph_http_requests_active gauge"));
    }

    #[test]
    fn test_timer() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.elapsed() >= Duration::from_millis(10));
    }
}
