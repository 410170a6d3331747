//! Prometheus metrics for the scan gate.
//!
//! All metrics follow the naming convention: `sg_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // DECISIONS
    // =========================================================================

    /// Decisions by outcome
    pub static ref SCAN_OUTCOMES: CounterVec = CounterVec::new(
        Opts::new("sg_scan_outcomes_total", "Scan decisions by outcome"),
        &["outcome"]  // granted / denied_duplicate / denied_invalid / error
    ).expect("metric creation failed");

    /// End-to-end decision latency as seen by the session
    pub static ref DECISION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "sg_decision_duration_seconds",
            "Time from accepted decode event to displayed result"
        ).buckets(exponential_buckets(0.0005, 2.0, 14).expect("valid buckets"))
    ).expect("metric creation failed");

    /// Identifiers granted since start (or since the store was replayed)
    pub static ref GRANTED_IDENTIFIERS: Gauge = Gauge::new(
        "sg_granted_identifiers",
        "Distinct identifiers holding a Granted record"
    ).expect("metric creation failed");

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Raw decode events by admission result
    pub static ref SCAN_EVENTS: CounterVec = CounterVec::new(
        Opts::new("sg_scan_events_total", "Decode events by admission result"),
        &["admission"]  // accepted / debounced / busy
    ).expect("metric creation failed");

    // =========================================================================
    // HISTORY
    // =========================================================================

    /// History queries served
    pub static ref HISTORY_QUERIES: Counter = Counter::new(
        "sg_history_queries_total",
        "History list requests"
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless; already registered collectors
/// are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SCAN_OUTCOMES.clone()),
        Box::new(DECISION_DURATION.clone()),
        Box::new(GRANTED_IDENTIFIERS.clone()),
        Box::new(SCAN_EVENTS.clone()),
        Box::new(HISTORY_QUERIES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    /// Taken once the sample is recorded.
    histogram: Option<Histogram>,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: Some(histogram.clone()),
            start: std::time::Instant::now(),
        }
    }

    /// Record the elapsed time now instead of on drop.
    pub fn observe(mut self) {
        self.record();
    }

    fn record(&mut self) {
        if let Some(histogram) = self.histogram.take() {
            histogram.observe(self.start.elapsed().as_secs_f64());
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.record();
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
