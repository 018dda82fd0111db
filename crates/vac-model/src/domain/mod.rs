mod auth;
pub use auth::{AuthBackendKind, AuthSource};

mod booking;
pub use booking::{Booking, BookingId, NewBooking};

mod date;
pub use date::{DateRange, format_date, parse_date};

mod entra;
pub use entra::EntraSettings;

mod slot;
pub use slot::{Half, SlotKind};

mod user;
pub use user::User;
