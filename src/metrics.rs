use std::time::Duration;

use metrics::{counter, histogram};

/// Metric names emitted through the `metrics` facade
pub mod names {
    /// Conversions run, labelled by outcome
    pub const CONVERSIONS_TOTAL: &str = "notice_drafter_conversions_total";
    /// Conversion pipeline duration
    pub const CONVERSION_DURATION: &str = "notice_drafter_conversion_duration_seconds";
    /// Autosave ticks, labelled by whether a row was written
    pub const AUTOSAVE_TICKS_TOTAL: &str = "notice_drafter_autosave_ticks_total";
    /// Store calls, labelled by operation and status
    pub const STORE_OPERATIONS_TOTAL: &str = "notice_drafter_store_operations_total";
    /// Errors, labelled by type and operation
    pub const ERRORS_TOTAL: &str = "notice_drafter_errors_total";
}

/// Metrics collection and management.
///
/// Keeps local tallies so callers can inspect a session, and forwards every
/// event to whatever `metrics` recorder the host installed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MetricsCollector {
    /// Conversions that filled the template
    pub conversions_total: u64,
    /// Conversions that fell back to the input text
    pub fallbacks_total: u64,
    /// Autosave ticks that wrote a row
    pub autosaves_total: u64,
    /// Autosave ticks that found nothing new
    pub autosave_skips_total: u64,
    /// Store operations recorded
    pub store_operations_total: u64,
    /// Errors recorded
    pub errors_total: u64,
}

impl MetricsCollector {
    /// Record one run of the conversion pipeline
    pub fn record_conversion(&mut self, fell_back: bool, duration: Duration) {
        let outcome = if fell_back { "fallback" } else { "formatted" };

        if fell_back {
            self.fallbacks_total += 1;
        } else {
            self.conversions_total += 1;
        }

        counter!(names::CONVERSIONS_TOTAL, "outcome" => outcome).increment(1);
        histogram!(names::CONVERSION_DURATION).record(duration.as_secs_f64());
    }

    /// Record an autosave tick
    pub fn record_autosave(&mut self, saved: bool) {
        if saved {
            self.autosaves_total += 1;
        } else {
            self.autosave_skips_total += 1;
        }

        let status = if saved { "saved" } else { "skipped" };
        counter!(names::AUTOSAVE_TICKS_TOTAL, "status" => status).increment(1);
    }

    /// Record store operation metrics
    pub fn record_store_operation(&mut self, operation: &'static str, success: bool) {
        self.store_operations_total += 1;
        let status = if success { "success" } else { "error" };

        counter!(names::STORE_OPERATIONS_TOTAL, "operation" => operation, "status" => status).increment(1);

        if !success {
            self.record_error("database", operation);
        }
    }

    /// Record error metrics
    pub fn record_error(&mut self, error_type: &'static str, operation: &'static str) {
        self.errors_total += 1;
        counter!(names::ERRORS_TOTAL, "type" => error_type, "operation" => operation).increment(1);
    }

    /// Share of conversions that fell back, 0.0 when nothing ran
    #[must_use]
    pub fn fallback_rate(&self) -> f64 {
        let total = self.conversions_total + self.fallbacks_total;
        if total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.fallbacks_total as f64 / total as f64;
        rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::default();
        assert_eq!(collector.conversions_total, 0);
        assert!((collector.fallback_rate() - 0.0).abs() < f64::EPSILON);
    }
}
