//! Request metrics.
//!
//! Metrics are recorded through the `metrics` facade. Nothing is exported
//! unless the embedding binary installs a recorder.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

use crate::error::ErrorKind;

// === Metric Name Constants ===

/// Request latency metric name.
pub const METRIC_REQUEST_LATENCY: &str = "api_request_latency_ms";
/// Successful requests counter metric name.
pub const METRIC_REQUESTS_SUCCEEDED: &str = "api_requests_succeeded_total";
/// Failed requests counter metric name (labelled by classification).
pub const METRIC_REQUESTS_FAILED: &str = "api_requests_failed_total";
/// Requests sent without a credential.
pub const METRIC_REQUESTS_UNAUTHENTICATED: &str = "api_requests_unauthenticated_total";
/// Credentials cleared after a 401.
pub const METRIC_SESSIONS_INVALIDATED: &str = "sessions_invalidated_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_REQUEST_LATENCY,
        "Backend request latency in milliseconds"
    );
    describe_counter!(
        METRIC_REQUESTS_SUCCEEDED,
        "Total number of requests answered with 2xx"
    );
    describe_counter!(
        METRIC_REQUESTS_FAILED,
        "Total number of classified request failures"
    );
    describe_counter!(
        METRIC_REQUESTS_UNAUTHENTICATED,
        "Total number of requests sent without a bearer credential"
    );
    describe_counter!(
        METRIC_SESSIONS_INVALIDATED,
        "Total number of credentials cleared after a 401"
    );

    debug!("Metrics initialized");
}

/// Record request latency for a service.
pub fn record_request_latency(start: Instant, service: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_REQUEST_LATENCY, "service" => service).record(latency_ms);
}

/// Increment the success counter.
pub fn inc_requests_succeeded(service: &'static str) {
    counter!(METRIC_REQUESTS_SUCCEEDED, "service" => service).increment(1);
}

/// Increment the failure counter for a classification.
pub fn inc_requests_failed(service: &'static str, kind: ErrorKind) {
    let kind: &'static str = kind.into();
    counter!(METRIC_REQUESTS_FAILED, "service" => service, "kind" => kind).increment(1);
}

/// Increment the unauthenticated request counter.
pub fn inc_requests_unauthenticated() {
    counter!(METRIC_REQUESTS_UNAUTHENTICATED).increment(1);
}

/// Increment the invalidated session counter.
pub fn inc_sessions_invalidated() {
    counter!(METRIC_SESSIONS_INVALIDATED).increment(1);
}

/// Measures one request from construction to [`RequestTimer::finish`].
pub struct RequestTimer {
    start: Instant,
    service: &'static str,
}

impl RequestTimer {
    /// Start timing a request to `service`.
    pub fn start(service: &'static str) -> Self {
        Self {
            start: Instant::now(),
            service,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Record latency and the outcome counter.
    pub fn finish(self, outcome: Option<ErrorKind>) {
        record_request_latency(self.start, self.service);
        match outcome {
            None => inc_requests_succeeded(self.service),
            Some(kind) => inc_requests_failed(self.service, kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn request_timer_measures_time() {
        let timer = RequestTimer::start("inventory");
        sleep(Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 9.0);
        // No recorder installed; finishing is a no-op sink.
        timer.finish(Some(ErrorKind::Unreachable));
    }
}
