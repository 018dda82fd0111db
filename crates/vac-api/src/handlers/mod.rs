//! Request handlers, grouped by surface.

pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod bookings;
pub(crate) mod calendar;
pub(crate) mod system;

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};

use crate::flash::{self, Flash};
use crate::session::Session;
use crate::state::AppState;

fn header_value(value: String) -> Option<HeaderValue> {
    // Our generated cookie/location strings are plain ASCII.
    HeaderValue::from_str(&value).ok()
}

/// 303 so that a redirected POST is re-fetched with GET.
pub(crate) fn redirect(to: &str) -> Response {
    let mut response = StatusCode::SEE_OTHER.into_response();
    if let Some(location) = header_value(to.to_string()) {
        response.headers_mut().insert(header::LOCATION, location);
    }
    response
}

/// Redirect carrying flash messages for the next page.
pub(crate) fn redirect_with_flash(to: &str, flashes: Vec<Flash>) -> Response {
    let mut response = redirect(to);
    if !flashes.is_empty()
        && let Some(cookie) = header_value(flash::set_cookie(&flashes))
    {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

/// A rendered page. Flashes were consumed into the markup, so the flash
/// cookie is cleared in the same response.
pub(crate) fn page(markup: String) -> Response {
    let mut response = Html(markup).into_response();
    if let Some(cookie) = header_value(flash::clear_cookie()) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

/// The `(username, is_admin)` pair pages are rendered with.
pub(crate) fn viewer<'a>(state: &AppState, session: &'a Session) -> (&'a str, bool) {
    (session.username.as_str(), state.is_admin(&session.username))
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::body::Body;
    use axum::http::{Request, Response, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use vac_model::AuthSource;

    use crate::state::AppState;

    pub(crate) async fn get(state: &AppState, uri: &str) -> Response<Body> {
        request(state, "GET", uri, None, None).await
    }

    pub(crate) async fn get_as(state: &AppState, uri: &str, username: &str) -> Response<Body> {
        request(state, "GET", uri, None, Some(username)).await
    }

    pub(crate) async fn post_as(
        state: &AppState,
        uri: &str,
        body: &str,
        username: &str,
    ) -> Response<Body> {
        request(state, "POST", uri, Some(body), Some(username)).await
    }

    pub(crate) async fn post_anon(state: &AppState, uri: &str, body: &str) -> Response<Body> {
        request(state, "POST", uri, Some(body), None).await
    }

    async fn request(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Option<&str>,
        username: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            );
        }
        if let Some(username) = username {
            let token = state.keys.issue(username, AuthSource::Internal).unwrap();
            builder = builder.header(header::COOKIE, format!("vac_session={token}"));
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_default())
            .unwrap();
        crate::router(state.clone()).oneshot(request).await.unwrap()
    }

    pub(crate) fn location(response: &Response<Body>) -> Option<&str> {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub(crate) async fn body_string(response: Response<Body>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}
