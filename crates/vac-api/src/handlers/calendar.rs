//! Month view and booking creation.

use axum::extract::{Form, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use serde::Deserialize;
use time::{Month, OffsetDateTime};
use tracing::info;

use vac_core::calendar::{month_bounds, month_grid};
use vac_core::metrics::BookingOutcome;
use vac_core::slots::{booking_conflicts, expand_slots};
use vac_model::{DateRange, NewBooking, SlotKind, parse_date};

use crate::error::ApiError;
use crate::flash::{self, Flash};
use crate::render::{self, BookingDraft, CalendarView};
use crate::session::{CurrentUser, Session};
use crate::state::AppState;

use super::{page, redirect, redirect_with_flash, viewer};

#[derive(Deserialize)]
pub(crate) struct MonthQuery {
    year: Option<i32>,
    month: Option<u8>,
}

fn resolve_month(query: &MonthQuery) -> (i32, Month) {
    let now = OffsetDateTime::now_utc().date();
    let year = query.year.unwrap_or_else(|| now.year());
    let month = query
        .month
        .and_then(|m| Month::try_from(m).ok())
        .unwrap_or_else(|| now.month());
    (year, month)
}

fn calendar_path(year: i32, month: Month) -> String {
    format!("/calendar?year={year}&month={}", month as u8)
}

pub(crate) async fn root(CurrentUser(session): CurrentUser) -> Response {
    match session {
        Some(_) => redirect("/calendar"),
        None => redirect("/login"),
    }
}

/// Render the month page. `draft` carries rejected form input back into
/// the booking form.
fn month_page(
    state: &AppState,
    session: &Session,
    year: i32,
    month: Month,
    draft: Option<BookingDraft<'_>>,
    flashes: &[Flash],
) -> Result<Response, ApiError> {
    let Some((first, last)) = month_bounds(year, month) else {
        return Ok(redirect_with_flash(
            "/calendar",
            vec![Flash::error("that month is out of range")],
        ));
    };
    let bookings = state.store.bookings_overlapping(first, last)?;
    let weeks = month_grid(first, last, &bookings);
    let users = state.store.list_users()?;
    let view = CalendarView {
        year,
        month,
        today: OffsetDateTime::now_utc().date(),
        weeks: &weeks,
        users: &users,
        month_bookings: &bookings,
        draft,
    };
    Ok(page(render::calendar_page(
        &view,
        viewer(state, session),
        flashes,
    )))
}

pub(crate) async fn month_view(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Query(query): Query<MonthQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(session) = session else {
        return Ok(redirect("/login"));
    };
    let (year, month) = resolve_month(&query);
    month_page(&state, &session, year, month, None, &flash::take(&headers))
}

#[derive(Deserialize)]
pub(crate) struct BookingForm {
    year: Option<i32>,
    month: Option<u8>,
    #[serde(default)]
    for_user: String,
    start_date: String,
    end_date: String,
    slot: String,
    #[serde(default)]
    comment: String,
}

/// Validate the submitted form into a `NewBooking`, or an error message for
/// the flash.
fn validate_booking(form: &BookingForm, username: String) -> Result<NewBooking, &'static str> {
    let start = parse_date(&form.start_date).map_err(|_| "invalid start date")?;
    let end = parse_date(&form.end_date).map_err(|_| "invalid end date")?;
    let range = DateRange::new(start, end).map_err(|_| "end date is before start date")?;
    let slot: SlotKind = form.slot.parse().map_err(|_| "invalid slot")?;
    let comment = form.comment.trim();
    Ok(NewBooking {
        username,
        range,
        comment: (!comment.is_empty()).then(|| comment.to_string()),
        slot,
    })
}

pub(crate) async fn create_booking(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Form(form): Form<BookingForm>,
) -> Result<Response, ApiError> {
    let Some(session) = session else {
        return Ok(redirect("/login"));
    };
    let (year, month) = resolve_month(&MonthQuery {
        year: form.year,
        month: form.month,
    });
    let back = calendar_path(year, month);
    let draft = BookingDraft {
        for_user: form.for_user.trim(),
        start_date: &form.start_date,
        end_date: &form.end_date,
        slot: form.slot.parse().unwrap_or(SlotKind::Full),
        comment: &form.comment,
    };

    let is_admin = state.is_admin(&session.username);
    let target = form.for_user.trim();
    let username = if is_admin && !target.is_empty() && target != session.username {
        if state.store.user(target)?.is_none() {
            state.metrics.record_booking(BookingOutcome::Invalid);
            return month_page(
                &state,
                &session,
                year,
                month,
                Some(draft),
                &[Flash::error("no such user")],
            );
        }
        target.to_string()
    } else {
        session.username.clone()
    };

    let booking = match validate_booking(&form, username) {
        Ok(booking) => booking,
        Err(message) => {
            state.metrics.record_booking(BookingOutcome::Invalid);
            return month_page(
                &state,
                &session,
                year,
                month,
                Some(draft),
                &[Flash::error(message)],
            );
        }
    };

    let candidate = expand_slots(booking.range, booking.slot);
    let existing: Vec<_> = state
        .store
        .bookings_overlapping(booking.range.start(), booking.range.end())?
        .into_iter()
        .filter(|b| b.username == booking.username)
        .collect();
    if booking_conflicts(&candidate, &existing, None) {
        state.metrics.record_booking(BookingOutcome::Conflict);
        return month_page(
            &state,
            &session,
            year,
            month,
            Some(draft),
            &[Flash::error("those dates overlap an existing booking")],
        );
    }

    let id = state.store.insert_booking(&booking)?;
    state.metrics.record_booking(BookingOutcome::Created);
    info!(
        id = %id,
        username = booking.username,
        start = %booking.range.start(),
        end = %booking.range.end(),
        slot = booking.slot.as_str(),
        "booking created"
    );
    Ok(redirect_with_flash(
        &back,
        vec![Flash::success("booking saved")],
    ))
}
