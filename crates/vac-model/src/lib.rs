mod domain;
pub use domain::{AuthBackendKind, AuthSource};
pub use domain::{Booking, BookingId, NewBooking};
pub use domain::{DateRange, format_date, parse_date};
pub use domain::{EntraSettings, User};
pub use domain::{Half, SlotKind};

mod error;
pub use error::{ModelError, ModelResult};
