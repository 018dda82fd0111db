use std::sync::Arc;

/// How a booking mutation ended, for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOutcome {
    /// Booking inserted.
    Created,
    /// Existing booking changed.
    Updated,
    /// Booking removed.
    Deleted,
    /// Rejected because it overlapped an existing booking.
    Conflict,
    /// Rejected by form validation.
    Invalid,
}

impl BookingOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            BookingOutcome::Created => "created",
            BookingOutcome::Updated => "updated",
            BookingOutcome::Deleted => "deleted",
            BookingOutcome::Conflict => "conflict",
            BookingOutcome::Invalid => "invalid",
        }
    }
}

/// Metrics collection interface.
///
/// Implementations are injected into the HTTP state; all label sets are
/// bounded (route names and the outcome labels above).
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record a finished HTTP request for a route with its response status.
    fn record_http_request(&self, route: &str, status: u16);

    /// Record the outcome of a booking mutation.
    fn record_booking(&self, outcome: BookingOutcome);

    /// Record a login attempt against a backend (`internal`, `pam`, `sso`).
    fn record_login(&self, backend: &str, success: bool);
}

/// Shared handle to a metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
