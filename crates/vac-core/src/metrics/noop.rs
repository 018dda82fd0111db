use crate::metrics::backend::{BookingOutcome, MetricsBackend};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_http_request(&self, _: &str, _: u16) {}

    #[inline(always)]
    fn record_booking(&self, _: BookingOutcome) {}

    #[inline(always)]
    fn record_login(&self, _: &str, _: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_metrics_is_zero_size() {
        assert_eq!(std::mem::size_of::<NoOpMetrics>(), 0);
    }
}
