//! Health and metrics endpoints.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use prometheus::{Encoder, TextEncoder};

use crate::error::ApiError;
use crate::state::AppState;

pub(crate) async fn healthz() -> &'static str {
    "ok"
}

/// Prometheus text exposition; 404 when no registry is wired in.
pub(crate) async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let Some(prometheus) = &state.prometheus else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus.gather(), &mut buffer)?;
    Ok((
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::super::tests::{body_string, get, get_as, post_as};
    use crate::state::tests::test_state_with_prometheus;

    #[tokio::test]
    async fn healthz_needs_no_session() {
        let state = test_state_with_prometheus();
        let response = get(&state, "/healthz").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_report_request_and_booking_counters() {
        let state = test_state_with_prometheus();
        state.store.create_user("alice", "h").unwrap();
        get_as(&state, "/calendar", "alice").await;
        post_as(
            &state,
            "/calendar",
            "year=2026&month=3&start_date=2026-03-10&end_date=2026-03-10&slot=full",
            "alice",
        )
        .await;

        let body = body_string(get(&state, "/metrics").await).await;
        assert!(body.contains("vac_http_requests_total"));
        assert!(body.contains(r#"vac_bookings_total{outcome="created"} 1"#));
    }

    #[tokio::test]
    async fn metrics_404_without_a_registry() {
        let state = crate::state::tests::test_state();
        let response = get(&state, "/metrics").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
