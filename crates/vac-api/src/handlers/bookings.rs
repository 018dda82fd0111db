//! Editing and deleting existing bookings.

use axum::extract::{Form, Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use serde::Deserialize;
use time::Month;
use tracing::info;

use vac_core::metrics::BookingOutcome;
use vac_core::slots::{booking_conflicts, expand_slots};
use vac_model::{Booking, BookingId, DateRange, SlotKind, parse_date};

use crate::error::ApiError;
use crate::flash::{self, Flash};
use crate::render;
use crate::session::{CurrentUser, Session};
use crate::state::AppState;

use super::{page, redirect, redirect_with_flash, viewer};

/// Owner-or-admin fetch; `None` also covers a missing row so the two cases
/// are indistinguishable to the caller.
fn editable_booking(
    state: &AppState,
    session: &Session,
    id: BookingId,
) -> Result<Option<Booking>, ApiError> {
    let Some(booking) = state.store.booking(id)? else {
        return Ok(None);
    };
    if booking.username != session.username && !state.is_admin(&session.username) {
        return Ok(None);
    }
    Ok(Some(booking))
}

#[derive(Deserialize)]
pub(crate) struct DeleteForm {
    year: Option<i32>,
    month: Option<u8>,
}

pub(crate) async fn delete_booking(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i64>,
    Form(form): Form<DeleteForm>,
) -> Result<Response, ApiError> {
    let Some(session) = session else {
        return Ok(redirect("/login"));
    };
    // A delete from the calendar list returns to the month it came from.
    let back = match (form.year, form.month.and_then(|m| Month::try_from(m).ok())) {
        (Some(year), Some(month)) => format!("/calendar?year={year}&month={}", month as u8),
        _ => "/overview".to_string(),
    };

    let Some(booking) = editable_booking(&state, &session, BookingId(id))? else {
        return Ok(redirect_with_flash(
            &back,
            vec![Flash::error("booking not found")],
        ));
    };
    state.store.delete_booking(booking.id)?;
    state.metrics.record_booking(BookingOutcome::Deleted);
    info!(id = %booking.id, username = booking.username, by = session.username, "booking deleted");
    Ok(redirect_with_flash(
        &back,
        vec![Flash::success("booking deleted")],
    ))
}

pub(crate) async fn edit_form(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(session) = session else {
        return Ok(redirect("/login"));
    };
    let Some(booking) = editable_booking(&state, &session, BookingId(id))? else {
        return Ok(redirect_with_flash(
            "/overview",
            vec![Flash::error("booking not found")],
        ));
    };
    Ok(page(render::edit_booking_page(
        &booking,
        viewer(&state, &session),
        &flash::take(&headers),
    )))
}

#[derive(Deserialize)]
pub(crate) struct EditForm {
    start_date: String,
    end_date: String,
    slot: String,
    #[serde(default)]
    comment: String,
}

pub(crate) async fn edit_submit(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i64>,
    Form(form): Form<EditForm>,
) -> Result<Response, ApiError> {
    let Some(session) = session else {
        return Ok(redirect("/login"));
    };
    let Some(booking) = editable_booking(&state, &session, BookingId(id))? else {
        return Ok(redirect_with_flash(
            "/overview",
            vec![Flash::error("booking not found")],
        ));
    };
    let back = format!("/booking/{id}/edit");

    let parsed = (|| {
        let start = parse_date(&form.start_date).map_err(|_| "invalid start date")?;
        let end = parse_date(&form.end_date).map_err(|_| "invalid end date")?;
        let range = DateRange::new(start, end).map_err(|_| "end date is before start date")?;
        let slot: SlotKind = form.slot.parse().map_err(|_| "invalid slot")?;
        Ok::<_, &'static str>((range, slot))
    })();
    let (range, slot) = match parsed {
        Ok(parsed) => parsed,
        Err(message) => {
            state.metrics.record_booking(BookingOutcome::Invalid);
            return Ok(redirect_with_flash(&back, vec![Flash::error(message)]));
        }
    };

    // The booking being edited must not conflict with itself.
    let candidate = expand_slots(range, slot);
    let existing: Vec<_> = state
        .store
        .bookings_overlapping(range.start(), range.end())?
        .into_iter()
        .filter(|b| b.username == booking.username)
        .collect();
    if booking_conflicts(&candidate, &existing, Some(booking.id)) {
        state.metrics.record_booking(BookingOutcome::Conflict);
        return Ok(redirect_with_flash(
            &back,
            vec![Flash::error("those dates overlap an existing booking")],
        ));
    }

    let comment = form.comment.trim();
    state.store.update_booking(
        booking.id,
        range,
        (!comment.is_empty()).then_some(comment),
        slot,
    )?;
    state.metrics.record_booking(BookingOutcome::Updated);
    info!(id = %booking.id, username = booking.username, by = session.username, "booking updated");
    Ok(redirect_with_flash(
        "/overview",
        vec![Flash::success("booking updated")],
    ))
}

pub(crate) async fn overview(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(session) = session else {
        return Ok(redirect("/login"));
    };
    let is_admin = state.is_admin(&session.username);
    let bookings = if is_admin {
        state.store.all_bookings()?
    } else {
        state.store.bookings_for_user(&session.username)?
    };
    Ok(page(render::overview_page(
        &bookings,
        (session.username.as_str(), is_admin),
        &flash::take(&headers),
    )))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{body_string, get_as, location, post_as};
    use crate::state::tests::test_state;
    use vac_model::{DateRange, NewBooking, SlotKind, parse_date};

    fn seed_booking(state: &crate::state::AppState, username: &str, start: &str, end: &str) -> i64 {
        let booking = NewBooking {
            username: username.to_string(),
            range: DateRange::new(parse_date(start).unwrap(), parse_date(end).unwrap()).unwrap(),
            comment: None,
            slot: SlotKind::Full,
        };
        state.store.insert_booking(&booking).unwrap().0
    }

    #[tokio::test]
    async fn owner_deletes_their_booking() {
        let state = test_state();
        state.store.create_user("alice", "h").unwrap();
        let id = seed_booking(&state, "alice", "2026-03-10", "2026-03-12");

        let response = post_as(&state, &format!("/booking/{id}/delete"), "", "alice").await;
        assert_eq!(location(&response), Some("/overview"));
        assert!(state.store.bookings_for_user("alice").unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_from_the_calendar_returns_to_the_month() {
        let state = test_state();
        state.store.create_user("alice", "h").unwrap();
        let id = seed_booking(&state, "alice", "2026-03-10", "2026-03-12");

        let response = post_as(
            &state,
            &format!("/booking/{id}/delete"),
            "year=2026&month=3",
            "alice",
        )
        .await;
        assert_eq!(location(&response), Some("/calendar?year=2026&month=3"));
    }

    #[tokio::test]
    async fn strangers_cannot_delete_foreign_bookings() {
        let state = test_state();
        state.store.create_user("alice", "h").unwrap();
        state.store.create_user("bob", "h").unwrap();
        let id = seed_booking(&state, "alice", "2026-03-10", "2026-03-12");

        post_as(&state, &format!("/booking/{id}/delete"), "", "bob").await;
        assert_eq!(state.store.bookings_for_user("alice").unwrap().len(), 1);

        // Admins can.
        state.store.set_admin("bob", true).unwrap();
        post_as(&state, &format!("/booking/{id}/delete"), "", "bob").await;
        assert!(state.store.bookings_for_user("alice").unwrap().is_empty());
    }

    #[tokio::test]
    async fn edit_moves_the_booking_and_stamps_edited_at() {
        let state = test_state();
        state.store.create_user("alice", "h").unwrap();
        let id = seed_booking(&state, "alice", "2026-03-10", "2026-03-12");

        let response = post_as(
            &state,
            &format!("/booking/{id}/edit"),
            "start_date=2026-03-20&end_date=2026-03-21&slot=am&comment=moved",
            "alice",
        )
        .await;
        assert_eq!(location(&response), Some("/overview"));

        let booking = state
            .store
            .booking(vac_model::BookingId(id))
            .unwrap()
            .unwrap();
        assert_eq!(booking.start_date, parse_date("2026-03-20").unwrap());
        assert_eq!(booking.slot, SlotKind::Am);
        assert_eq!(booking.comment.as_deref(), Some("moved"));
        assert!(booking.edited_at.is_some());
    }

    #[tokio::test]
    async fn edit_does_not_conflict_with_itself() {
        let state = test_state();
        state.store.create_user("alice", "h").unwrap();
        let id = seed_booking(&state, "alice", "2026-03-10", "2026-03-12");

        // Shrinking within the original range would be a self-conflict if
        // the check did not exclude the edited booking.
        let response = post_as(
            &state,
            &format!("/booking/{id}/edit"),
            "start_date=2026-03-11&end_date=2026-03-11&slot=full",
            "alice",
        )
        .await;
        assert_eq!(location(&response), Some("/overview"));
    }

    #[tokio::test]
    async fn edit_into_another_booking_is_rejected() {
        let state = test_state();
        state.store.create_user("alice", "h").unwrap();
        let id = seed_booking(&state, "alice", "2026-03-10", "2026-03-12");
        seed_booking(&state, "alice", "2026-03-20", "2026-03-21");

        let response = post_as(
            &state,
            &format!("/booking/{id}/edit"),
            "start_date=2026-03-19&end_date=2026-03-20&slot=full",
            "alice",
        )
        .await;
        assert_eq!(location(&response), Some(format!("/booking/{id}/edit").as_str()));
    }

    #[tokio::test]
    async fn overview_scopes_to_the_viewer() {
        let state = test_state();
        state.store.create_user("alice", "h").unwrap();
        state.store.create_user("bob", "h").unwrap();
        seed_booking(&state, "alice", "2026-03-10", "2026-03-12");
        seed_booking(&state, "bob", "2026-04-01", "2026-04-02");

        let own = body_string(get_as(&state, "/overview", "alice").await).await;
        assert!(own.contains("2026-03-10"));
        assert!(!own.contains("2026-04-01"));

        state.store.set_admin("alice", true).unwrap();
        let all = body_string(get_as(&state, "/overview", "alice").await).await;
        assert!(all.contains("2026-04-01"));
    }
}
