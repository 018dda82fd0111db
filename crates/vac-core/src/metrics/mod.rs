//! Metrics collection abstraction.
//!
//! The HTTP layer records request and booking events through
//! [`MetricsBackend`]; the prometheus implementation lives in its own crate
//! so that the core stays dependency-free.
mod backend;
pub use backend::{BookingOutcome, MetricsBackend, MetricsHandle};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
