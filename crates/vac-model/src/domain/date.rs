use time::macros::format_description;
use time::{Date, Duration};

use crate::error::ModelError;

const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Parse an ISO `YYYY-MM-DD` date as submitted by the booking forms and
/// stored in the database.
pub fn parse_date(value: &str) -> Result<Date, ModelError> {
    Date::parse(value, DATE_FORMAT).map_err(|_| ModelError::InvalidDate(value.to_string()))
}

/// Format a date in the same ISO `YYYY-MM-DD` form that [`parse_date`]
/// accepts. Used for the database columns and the HTML date inputs.
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Inclusive date range with `start <= end` enforced at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, ModelError> {
        if end < start {
            return Err(ModelError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> Date {
        self.start
    }

    pub const fn end(&self) -> Date {
        self.end
    }

    /// Iterate every day of the range, both endpoints included.
    pub fn days(&self) -> impl Iterator<Item = Date> + use<> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |d| {
            d.checked_add(Duration::days(1)).filter(|next| *next <= end)
        })
    }
}
