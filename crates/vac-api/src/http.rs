//! Route table and request metrics.

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{admin, auth, bookings, calendar, system};
use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(calendar::root))
        .route("/login", get(auth::login_form).post(auth::login_submit))
        .route("/login/sso", get(auth::sso_start))
        .route("/auth/entra/callback", get(auth::sso_callback))
        .route(
            "/register",
            get(auth::register_form).post(auth::register_submit),
        )
        .route("/logout", post(auth::logout))
        .route(
            "/change-password",
            get(auth::change_password_form).post(auth::change_password_submit),
        )
        .route(
            "/calendar",
            get(calendar::month_view).post(calendar::create_booking),
        )
        .route("/booking/{id}/delete", post(bookings::delete_booking))
        .route(
            "/booking/{id}/edit",
            get(bookings::edit_form).post(bookings::edit_submit),
        )
        .route("/overview", get(bookings::overview))
        .route("/admin/users", get(admin::users_page))
        .route("/admin/users/{username}/admin", post(admin::set_admin_flag))
        .route(
            "/admin/users/{username}/password",
            get(admin::password_form).post(admin::password_submit),
        )
        .route(
            "/admin/users/{username}/delete",
            get(admin::delete_form).post(admin::delete_submit),
        )
        .route(
            "/admin/entra",
            get(admin::entra_form).post(admin::entra_submit),
        )
        .route("/healthz", get(system::healthz))
        .route("/metrics", get(system::metrics))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            track_requests,
        ))
        .with_state(state)
}

/// Count every request by route template and status. Unmatched paths are
/// counted under their literal path, which only happens for 404s.
async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let response = next.run(request).await;
    state
        .metrics
        .record_http_request(&route, response.status().as_u16());
    response
}
