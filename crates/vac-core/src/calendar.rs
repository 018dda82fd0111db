//! Monthly calendar grid construction.

use std::collections::BTreeMap;

use time::{Date, Month};

use vac_model::{Booking, SlotKind};

/// One booking shown inside a day cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEntry {
    pub username: String,
    pub comment: Option<String>,
    pub slot: SlotKind,
}

/// One day of the displayed month with the bookings overlapping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: Date,
    pub entries: Vec<DayEntry>,
}

/// A display week, Monday first. Cells outside the month are `None`.
pub type Week = [Option<DayCell>; 7];

/// First and last day of the given month.
///
/// `None` only for years outside the supported calendar range, which can
/// happen with hand-crafted query parameters.
pub fn month_bounds(year: i32, month: Month) -> Option<(Date, Date)> {
    let first = Date::from_calendar_date(year, month, 1).ok()?;
    let (next_year, next_month) = next_month(year, month);
    let next_first = Date::from_calendar_date(next_year, next_month, 1).ok()?;
    Some((first, next_first.previous_day()?))
}

/// Year/month pair of the previous month (January wraps to December).
pub fn prev_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::January => (year - 1, Month::December),
        _ => (year, month.previous()),
    }
}

/// Year/month pair of the next month (December wraps to January).
pub fn next_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::December => (year + 1, Month::January),
        _ => (year, month.next()),
    }
}

/// Group the days of `[first, last]` into Monday-based weeks, attaching the
/// bookings overlapping each day. Bookings are clamped to the month, so a
/// range reaching into the neighbouring months contributes only its visible
/// days.
pub fn month_grid(first: Date, last: Date, bookings: &[Booking]) -> Vec<Week> {
    let mut days: BTreeMap<Date, Vec<DayEntry>> = BTreeMap::new();
    let mut cursor = first;
    while cursor <= last {
        days.insert(cursor, Vec::new());
        match cursor.next_day() {
            Some(next) => cursor = next,
            None => break,
        }
    }

    for booking in bookings {
        let start = booking.start_date.max(first);
        let end = booking.end_date.min(last);
        let mut day = start;
        while day <= end {
            if let Some(entries) = days.get_mut(&day) {
                entries.push(DayEntry {
                    username: booking.username.clone(),
                    comment: booking.comment.clone(),
                    slot: booking.slot,
                });
            }
            match day.next_day() {
                Some(next) => day = next,
                None => break,
            }
        }
    }

    let mut weeks: Vec<Week> = Vec::new();
    let mut week: Week = Default::default();
    let mut slot = usize::from(first.weekday().number_days_from_monday());
    for (date, entries) in days {
        week[slot] = Some(DayCell { date, entries });
        if slot == 6 {
            weeks.push(std::mem::take(&mut week));
            slot = 0;
        } else {
            slot += 1;
        }
    }
    if week.iter().any(Option::is_some) {
        weeks.push(week);
    }
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use vac_model::BookingId;

    fn booking(start: Date, end: Date) -> Booking {
        Booking {
            id: BookingId(1),
            username: "alice".into(),
            start_date: start,
            end_date: end,
            comment: Some("ski trip".into()),
            slot: SlotKind::Full,
            created_at: String::new(),
            edited_at: None,
        }
    }

    #[test]
    fn bounds_of_regular_and_leap_months() {
        let (first, last) = month_bounds(2025, Month::April).unwrap();
        assert_eq!(first, date!(2025 - 04 - 01));
        assert_eq!(last, date!(2025 - 04 - 30));

        let (_, last) = month_bounds(2024, Month::February).unwrap();
        assert_eq!(last, date!(2024 - 02 - 29));

        let (_, last) = month_bounds(2025, Month::December).unwrap();
        assert_eq!(last, date!(2025 - 12 - 31));
    }

    #[test]
    fn month_navigation_wraps_at_year_edges() {
        assert_eq!(prev_month(2025, Month::January), (2024, Month::December));
        assert_eq!(next_month(2025, Month::December), (2026, Month::January));
        assert_eq!(next_month(2025, Month::May), (2025, Month::June));
    }

    #[test]
    fn every_day_appears_exactly_once() {
        let (first, last) = month_bounds(2025, Month::June).unwrap();
        let weeks = month_grid(first, last, &[]);
        let dates: Vec<Date> = weeks
            .iter()
            .flatten()
            .flatten()
            .map(|cell| cell.date)
            .collect();
        assert_eq!(dates.len(), 30);
        assert_eq!(dates.first(), Some(&first));
        assert_eq!(dates.last(), Some(&last));
    }

    #[test]
    fn grid_starts_on_the_right_weekday() {
        // 2025-05-01 is a Thursday, so Mon..Wed of the first week are empty.
        let (first, last) = month_bounds(2025, Month::May).unwrap();
        let weeks = month_grid(first, last, &[]);
        let first_week = &weeks[0];
        assert!(first_week[0].is_none());
        assert!(first_week[2].is_none());
        assert_eq!(
            first_week[3].as_ref().map(|c| c.date),
            Some(date!(2025 - 05 - 01))
        );
    }

    #[test]
    fn bookings_are_clamped_to_the_month() {
        let (first, last) = month_bounds(2025, Month::May).unwrap();
        let long = booking(date!(2025 - 04 - 28), date!(2025 - 06 - 03));
        let weeks = month_grid(first, last, &[long]);
        let populated: usize = weeks
            .iter()
            .flatten()
            .flatten()
            .filter(|cell| !cell.entries.is_empty())
            .count();
        assert_eq!(populated, 31);
    }

    #[test]
    fn far_future_year_has_no_bounds() {
        assert!(month_bounds(1_000_000, Month::January).is_none());
    }
}
