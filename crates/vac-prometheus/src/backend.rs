use std::sync::Arc;

use prometheus::{CounterVec, Opts, Registry, proto::MetricFamily};

use vac_core::metrics::{BookingOutcome, MetricsBackend};

/// Prometheus metrics backend.
///
/// ## Metrics
/// - `vac_http_requests_total{route, status}` - finished HTTP requests
/// - `vac_bookings_total{outcome}` - booking mutations by outcome
/// - `vac_logins_total{backend, result}` - login attempts
///
/// ## Label cardinality
/// All labels are bounded: routes are the route table, outcomes and
/// backends are small enums, status is the handful of codes the app emits.
#[derive(Clone)]
pub struct PrometheusMetrics {
    http_requests: CounterVec,
    bookings: CounterVec,
    logins: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a new backend registered against a custom registry.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let http_requests = CounterVec::new(
            Opts::new("http_requests_total", "Total finished HTTP requests").namespace("vac"),
            &["route", "status"],
        )?;
        registry.register(Box::new(http_requests.clone()))?;

        let bookings = CounterVec::new(
            Opts::new("bookings_total", "Booking mutations by outcome").namespace("vac"),
            &["outcome"],
        )?;
        registry.register(Box::new(bookings.clone()))?;

        let logins = CounterVec::new(
            Opts::new("logins_total", "Login attempts by backend and result").namespace("vac"),
            &["backend", "result"],
        )?;
        registry.register(Box::new(logins.clone()))?;

        Ok(Self {
            http_requests,
            bookings,
            logins,
            registry,
        })
    }

    /// Create a new backend with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metric families for text encoding at `/metrics`.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_http_request(&self, route: &str, status: u16) {
        self.http_requests
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    fn record_booking(&self, outcome: BookingOutcome) {
        self.bookings
            .with_label_values(&[outcome.as_label()])
            .inc();
    }

    fn record_login(&self, backend: &str, success: bool) {
        let result = if success { "success" } else { "failure" };
        self.logins.with_label_values(&[backend, result]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_gather() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_http_request("/calendar", 200);
        metrics.record_booking(BookingOutcome::Created);
        metrics.record_login("internal", true);

        let families = metrics.gather();
        let names: Vec<_> = families.iter().map(|f| f.name()).collect();
        assert!(names.contains(&"vac_http_requests_total"));
        assert!(names.contains(&"vac_bookings_total"));
        assert!(names.contains(&"vac_logins_total"));
    }

    #[test]
    fn duplicate_registration_fails() {
        let registry = Arc::new(Registry::new());
        assert!(PrometheusMetrics::new_with_registry(registry.clone()).is_ok());
        assert!(PrometheusMetrics::new_with_registry(registry).is_err());
    }
}
