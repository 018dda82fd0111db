pub mod calendar;
pub mod color;
pub mod metrics;
pub mod slots;

pub mod prelude {
    pub use crate::calendar::{DayCell, DayEntry, Week, month_bounds, month_grid};
    pub use crate::color::user_color;
    pub use crate::metrics::{BookingOutcome, MetricsBackend, MetricsHandle, noop_metrics};
    pub use crate::slots::{booking_conflicts, expand_slots};
}
