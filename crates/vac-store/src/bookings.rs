use rusqlite::{OptionalExtension, Row, params};
use time::Date;

use vac_model::{Booking, BookingId, DateRange, NewBooking, SlotKind, format_date, parse_date};

use crate::error::{StoreError, StoreResult};
use crate::store::Store;

const BOOKING_COLUMNS: &str =
    "id, username, start_date, end_date, comment, slot, created_at, edited_at";

/// Row image before the date columns have been parsed.
struct RawBooking {
    id: i64,
    username: String,
    start_date: String,
    end_date: String,
    comment: Option<String>,
    slot: Option<String>,
    created_at: String,
    edited_at: Option<String>,
}

fn raw_from_row(row: &Row<'_>) -> rusqlite::Result<RawBooking> {
    Ok(RawBooking {
        id: row.get(0)?,
        username: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        comment: row.get(4)?,
        slot: row.get(5)?,
        created_at: row.get(6)?,
        edited_at: row.get(7)?,
    })
}

fn into_booking(raw: RawBooking) -> StoreResult<Booking> {
    let start_date = parse_date(&raw.start_date)
        .map_err(|_| StoreError::Corrupt(format!("booking {}: start_date", raw.id)))?;
    let end_date = parse_date(&raw.end_date)
        .map_err(|_| StoreError::Corrupt(format!("booking {}: end_date", raw.id)))?;
    Ok(Booking {
        id: BookingId(raw.id),
        username: raw.username,
        start_date,
        end_date,
        comment: raw.comment,
        slot: SlotKind::from_column(raw.slot.as_deref()),
        created_at: raw.created_at,
        edited_at: raw.edited_at,
    })
}

impl Store {
    pub fn insert_booking(&self, booking: &NewBooking) -> StoreResult<BookingId> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO vacations (username, start_date, end_date, comment, slot)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                booking.username,
                format_date(booking.range.start()),
                format_date(booking.range.end()),
                booking.comment,
                booking.slot.column_value(),
            ],
        )?;
        Ok(BookingId(conn.last_insert_rowid()))
    }

    /// Rewrite range, comment and slot of a booking; stamps `edited_at`.
    /// Returns false when the id does not exist.
    pub fn update_booking(
        &self,
        id: BookingId,
        range: DateRange,
        comment: Option<&str>,
        slot: SlotKind,
    ) -> StoreResult<bool> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE vacations
             SET start_date = ?1, end_date = ?2, comment = ?3, slot = ?4,
                 edited_at = CURRENT_TIMESTAMP
             WHERE id = ?5",
            params![
                format_date(range.start()),
                format_date(range.end()),
                comment,
                slot.column_value(),
                id.0,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_booking(&self, id: BookingId) -> StoreResult<bool> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM vacations WHERE id = ?1", params![id.0])?;
        Ok(deleted > 0)
    }

    pub fn booking(&self, id: BookingId) -> StoreResult<Option<Booking>> {
        let conn = self.conn();
        let raw = conn
            .query_row(
                &format!("SELECT {BOOKING_COLUMNS} FROM vacations WHERE id = ?1"),
                params![id.0],
                raw_from_row,
            )
            .optional()?;
        raw.map(into_booking).transpose()
    }

    /// All bookings of one user, newest range first.
    pub fn bookings_for_user(&self, username: &str) -> StoreResult<Vec<Booking>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS} FROM vacations
             WHERE username = ?1 ORDER BY start_date DESC"
        ))?;
        let raws = stmt
            .query_map(params![username], raw_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(into_booking).collect()
    }

    /// Every booking in the system, newest range first.
    pub fn all_bookings(&self) -> StoreResult<Vec<Booking>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS} FROM vacations
             ORDER BY start_date DESC, username"
        ))?;
        let raws = stmt
            .query_map([], raw_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(into_booking).collect()
    }

    /// Bookings overlapping the inclusive `[first, last]` window, e.g. one
    /// displayed month. Ordered by start date, then username, which is the
    /// order the calendar cells list them in.
    pub fn bookings_overlapping(&self, first: Date, last: Date) -> StoreResult<Vec<Booking>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS} FROM vacations
             WHERE start_date <= ?1 AND end_date >= ?2
             ORDER BY start_date, username"
        ))?;
        let raws = stmt
            .query_map(params![format_date(last), format_date(first)], raw_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(into_booking).collect()
    }
}
