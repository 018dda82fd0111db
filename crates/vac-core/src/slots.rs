//! Half-day slot expansion and overlap detection.
//!
//! A booking is modelled as the set of `(date, half)` pairs it occupies.
//! Two bookings conflict when those sets intersect, which makes the
//! full-day/half-day rules fall out of plain set logic: a full day blocks
//! both halves, an AM booking leaves the PM half of the same day free.

use std::collections::HashSet;

use time::Date;

use vac_model::{Booking, BookingId, DateRange, Half, SlotKind};

/// Expand a booking range into the half-day slots it occupies.
pub fn expand_slots(range: DateRange, kind: SlotKind) -> HashSet<(Date, Half)> {
    let mut slots = HashSet::new();
    for day in range.days() {
        for half in kind.halves() {
            slots.insert((day, *half));
        }
    }
    slots
}

/// Whether a candidate slot set collides with any of the given bookings.
///
/// `exclude` skips one booking id so that editing a booking does not
/// conflict with itself. Rows whose stored range is reversed (out-of-band
/// database edits) are ignored rather than treated as blocking.
pub fn booking_conflicts(
    candidate: &HashSet<(Date, Half)>,
    existing: &[Booking],
    exclude: Option<BookingId>,
) -> bool {
    existing
        .iter()
        .filter(|booking| Some(booking.id) != exclude)
        .filter_map(|booking| booking.range().map(|range| (range, booking.slot)))
        .any(|(range, slot)| {
            expand_slots(range, slot)
                .iter()
                .any(|slot| candidate.contains(slot))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn booking(id: i64, start: Date, end: Date, slot: SlotKind) -> Booking {
        Booking {
            id: BookingId(id),
            username: "alice".into(),
            start_date: start,
            end_date: end,
            comment: None,
            slot,
            created_at: "2025-01-01 00:00:00".into(),
            edited_at: None,
        }
    }

    fn range(start: Date, end: Date) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    #[test]
    fn full_day_expands_to_both_halves() {
        let slots = expand_slots(
            range(date!(2025 - 03 - 10), date!(2025 - 03 - 11)),
            SlotKind::Full,
        );
        assert_eq!(slots.len(), 4);
        assert!(slots.contains(&(date!(2025 - 03 - 10), Half::Am)));
        assert!(slots.contains(&(date!(2025 - 03 - 11), Half::Pm)));
    }

    #[test]
    fn half_day_expands_to_one_half_per_day() {
        let slots = expand_slots(
            range(date!(2025 - 03 - 10), date!(2025 - 03 - 12)),
            SlotKind::Pm,
        );
        assert_eq!(slots.len(), 3);
        assert!(!slots.contains(&(date!(2025 - 03 - 10), Half::Am)));
    }

    #[test]
    fn opposite_halves_of_same_day_do_not_conflict() {
        let existing = vec![booking(
            1,
            date!(2025 - 04 - 01),
            date!(2025 - 04 - 01),
            SlotKind::Am,
        )];
        let candidate = expand_slots(
            range(date!(2025 - 04 - 01), date!(2025 - 04 - 01)),
            SlotKind::Pm,
        );
        assert!(!booking_conflicts(&candidate, &existing, None));
    }

    #[test]
    fn half_day_conflicts_with_overlapping_full_day() {
        let existing = vec![booking(
            1,
            date!(2025 - 04 - 01),
            date!(2025 - 04 - 03),
            SlotKind::Full,
        )];
        let candidate = expand_slots(
            range(date!(2025 - 04 - 03), date!(2025 - 04 - 03)),
            SlotKind::Am,
        );
        assert!(booking_conflicts(&candidate, &existing, None));
    }

    #[test]
    fn touching_ranges_without_overlap_are_fine() {
        let existing = vec![booking(
            1,
            date!(2025 - 04 - 01),
            date!(2025 - 04 - 02),
            SlotKind::Full,
        )];
        let candidate = expand_slots(
            range(date!(2025 - 04 - 03), date!(2025 - 04 - 04)),
            SlotKind::Full,
        );
        assert!(!booking_conflicts(&candidate, &existing, None));
    }

    #[test]
    fn excluded_booking_is_ignored() {
        let existing = vec![booking(
            7,
            date!(2025 - 04 - 01),
            date!(2025 - 04 - 05),
            SlotKind::Full,
        )];
        let candidate = expand_slots(
            range(date!(2025 - 04 - 02), date!(2025 - 04 - 04)),
            SlotKind::Full,
        );
        assert!(booking_conflicts(&candidate, &existing, None));
        assert!(!booking_conflicts(
            &candidate,
            &existing,
            Some(BookingId(7))
        ));
    }

    #[test]
    fn reversed_stored_range_never_blocks() {
        let existing = vec![booking(
            1,
            date!(2025 - 04 - 05),
            date!(2025 - 04 - 01),
            SlotKind::Full,
        )];
        let candidate = expand_slots(
            range(date!(2025 - 04 - 02), date!(2025 - 04 - 03)),
            SlotKind::Full,
        );
        assert!(!booking_conflicts(&candidate, &existing, None));
    }
}
