use std::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::{DateRange, SlotKind};

/// Identifier of a booking row (SQLite rowid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub i64);

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored vacation booking.
///
/// `start_date`/`end_date` are inclusive. Timestamps are the SQLite
/// `CURRENT_TIMESTAMP` text and are only ever displayed, never computed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    pub username: String,
    pub start_date: Date,
    pub end_date: Date,
    pub comment: Option<String>,
    pub slot: SlotKind,
    pub created_at: String,
    pub edited_at: Option<String>,
}

impl Booking {
    /// Range covered by this booking. Stored rows were validated on insert,
    /// so a reversed range can only come from out-of-band database edits.
    pub fn range(&self) -> Option<DateRange> {
        DateRange::new(self.start_date, self.end_date).ok()
    }
}

/// Booking data as validated from a submitted form, before it has an id.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub username: String,
    pub range: DateRange,
    pub comment: Option<String>,
    pub slot: SlotKind,
}
