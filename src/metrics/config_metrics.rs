//! Reload metrics tracking using OpenTelemetry.

use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use std::time::Instant;

/// Metrics collector for reload cycles.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_props::metrics::ConfigMetrics;
/// use opentelemetry::global;
///
/// let meter = global::meter("hotswap-props");
/// let metrics = ConfigMetrics::new(meter);
///
/// let timer = metrics.start_reload();
/// // ... run the cycle ...
/// metrics.record_reload_success(timer);
/// ```
#[derive(Clone)]
pub struct ConfigMetrics {
    reload_attempts: Counter<u64>,
    reload_success: Counter<u64>,
    reload_skipped: Counter<u64>,
    reload_failures: Counter<u64>,
    reload_duration: Histogram<f64>,
    listener_failures: Counter<u64>,
    property_count: Gauge<u64>,
}

impl ConfigMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let reload_attempts = meter
            .u64_counter("hotswap_props.reload.attempts")
            .with_description("Total number of reload attempts")
            .build();

        let reload_success = meter
            .u64_counter("hotswap_props.reload.success")
            .with_description("Number of reloads that published a new mapping")
            .build();

        let reload_skipped = meter
            .u64_counter("hotswap_props.reload.skipped")
            .with_description("Number of reloads skipped because no source changed")
            .build();

        let reload_failures = meter
            .u64_counter("hotswap_props.reload.failures")
            .with_description("Number of failed reloads")
            .build();

        let reload_duration = meter
            .f64_histogram("hotswap_props.reload.duration")
            .with_description("Duration of reload cycles in seconds")
            .with_unit("s")
            .build();

        let listener_failures = meter
            .u64_counter("hotswap_props.listener.failures")
            .with_description("Number of reloads a listener refused or failed")
            .build();

        let property_count = meter
            .u64_gauge("hotswap_props.properties")
            .with_description("Number of properties in the live mapping")
            .build();

        Self {
            reload_attempts,
            reload_success,
            reload_skipped,
            reload_failures,
            reload_duration,
            listener_failures,
            property_count,
        }
    }

    /// Start a reload cycle timer.
    ///
    /// Pass the returned `Instant` to `record_reload_success` or
    /// `record_reload_failure` when the cycle completes.
    pub fn start_reload(&self) -> Instant {
        self.reload_attempts.add(1, &[]);
        Instant::now()
    }

    /// Record a cycle that published a new mapping.
    pub fn record_reload_success(&self, start: Instant) {
        self.reload_success.add(1, &[]);
        self.reload_duration.record(start.elapsed().as_secs_f64(), &[]);
    }

    /// Record a cycle that found nothing to do.
    pub fn record_reload_skipped(&self) {
        self.reload_skipped.add(1, &[]);
    }

    /// Record a failed cycle.
    pub fn record_reload_failure(&self, start: Instant) {
        self.reload_failures.add(1, &[]);
        self.reload_duration.record(start.elapsed().as_secs_f64(), &[]);
    }

    /// Record a listener refusing or failing a reload.
    pub fn record_listener_failure(&self) {
        self.listener_failures.add(1, &[]);
    }

    /// Update the live property count.
    pub fn update_property_count(&self, count: usize) {
        self.property_count.record(count as u64, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::global;

    #[test]
    fn test_metrics_creation() {
        let metrics = ConfigMetrics::new(global::meter("test"));

        // Recording against the no-op global provider must not panic
        let timer = metrics.start_reload();
        metrics.record_reload_success(timer);
        metrics.update_property_count(3);

        let timer = metrics.start_reload();
        metrics.record_listener_failure();
        metrics.record_reload_failure(timer);

        metrics.start_reload();
        metrics.record_reload_skipped();
    }

    #[test]
    fn test_metrics_clone() {
        let metrics = ConfigMetrics::new(global::meter("test"));
        let metrics2 = metrics.clone();

        let timer1 = metrics.start_reload();
        let timer2 = metrics2.start_reload();

        metrics.record_reload_success(timer1);
        metrics2.record_reload_success(timer2);
    }
}
