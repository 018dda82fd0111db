//! Login, registration and password management.

use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use serde::Deserialize;
use tracing::{info, warn};

use vac_auth::{authorize_url, claims_username, hash_password, placeholder_hash, verify_password};
use vac_model::{AuthBackendKind, AuthSource};
use vac_store::StoreError;

use crate::error::ApiError;
use crate::flash::{self, Flash};
use crate::render;
use crate::session::{self, CurrentUser};
use crate::state::AppState;

use super::{page, redirect, redirect_with_flash, viewer};

fn login_success(state: &AppState, username: &str, source: AuthSource) -> Result<Response, ApiError> {
    let token = state.keys.issue(username, source)?;
    let mut response = redirect("/calendar");
    if let Some(cookie) = super::header_value(session::set_session_cookie(&token)) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    info!(username, source = source.as_str(), "login");
    Ok(response)
}

pub(crate) async fn login_form(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if session.is_some() {
        return Ok(redirect("/calendar"));
    }
    let sso_ready = state.store.entra_settings()?.sso_ready();
    Ok(page(render::login_page(&flash::take(&headers), sso_ready)))
}

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    username: String,
    password: String,
}

/// Internal accounts are keyed lowercase; PAM names pass through untouched
/// because system account names are case-sensitive.
fn login_username(backend: AuthBackendKind, raw: &str) -> String {
    let trimmed = raw.trim();
    match backend {
        AuthBackendKind::Internal => trimmed.to_lowercase(),
        AuthBackendKind::Pam => trimmed.to_string(),
    }
}

pub(crate) async fn login_submit(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let backend = state.auth_backend;
    let username = login_username(backend, &form.username);
    if username.is_empty() || form.password.is_empty() {
        state.metrics.record_login(backend.as_str(), false);
        return Ok(redirect_with_flash(
            "/login",
            vec![Flash::error("username and password are required")],
        ));
    }

    let ok = state.password_auth.verify(&username, &form.password).await?;
    state.metrics.record_login(backend.as_str(), ok);
    if !ok {
        warn!(username, backend = backend.as_str(), "login refused");
        return Ok(redirect_with_flash(
            "/login",
            vec![Flash::error("invalid username or password")],
        ));
    }

    // PAM identities get a local row so admin flags and bookings have
    // something to attach to.
    if backend == AuthBackendKind::Pam {
        let placeholder = placeholder_hash()?;
        if state.store.ensure_user(&username, &placeholder)? {
            info!(username, "provisioned local account for system user");
        }
    }
    login_success(&state, &username, backend.into())
}

pub(crate) async fn logout() -> Response {
    let mut response = redirect("/login");
    if let Some(cookie) = super::header_value(session::clear_session_cookie()) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

pub(crate) async fn sso_start(State(state): State<AppState>) -> Result<Response, ApiError> {
    let settings = state.store.entra_settings()?;
    if !settings.sso_ready() {
        return Ok(redirect_with_flash(
            "/login",
            vec![Flash::error("single sign-on is not configured")],
        ));
    }
    let url = authorize_url(&settings, &state.redirect_uri())?;
    Ok(redirect(url.as_str()))
}

#[derive(Deserialize)]
pub(crate) struct SsoCallback {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

pub(crate) async fn sso_callback(
    State(state): State<AppState>,
    Query(query): Query<SsoCallback>,
) -> Result<Response, ApiError> {
    if let Some(error) = query.error {
        warn!(
            error,
            description = query.error_description.as_deref().unwrap_or(""),
            "sso callback returned an error"
        );
        state.metrics.record_login("sso", false);
        return Ok(redirect_with_flash(
            "/login",
            vec![Flash::error("single sign-on failed")],
        ));
    }
    let Some(code) = query.code else {
        state.metrics.record_login("sso", false);
        return Ok(redirect_with_flash(
            "/login",
            vec![Flash::error("single sign-on failed")],
        ));
    };

    let settings = state.store.entra_settings()?;
    let redirect_uri = state.redirect_uri();
    let username = async {
        let id_token = state.entra.redeem_code(&settings, &code, &redirect_uri).await?;
        claims_username(&id_token)
    }
    .await;
    let username = match username {
        Ok(username) => username,
        Err(e) => {
            warn!(error = %e, "sso code redemption failed");
            state.metrics.record_login("sso", false);
            return Ok(redirect_with_flash(
                "/login",
                vec![Flash::error("single sign-on failed")],
            ));
        }
    };

    // SSO accounts carry a random placeholder hash; password login for them
    // always fails.
    let placeholder = placeholder_hash()?;
    if state.store.ensure_user(&username, &placeholder)? {
        info!(username, "provisioned local account for sso user");
    }
    state.metrics.record_login("sso", true);
    login_success(&state, &username, AuthSource::Sso)
}

pub(crate) async fn register_form(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if state.auth_backend != AuthBackendKind::Internal {
        return Ok(redirect("/login"));
    }
    let token_required = state.registration_token().is_some();
    Ok(page(render::register_page(
        &flash::take(&headers),
        token_required,
    )))
}

#[derive(Deserialize)]
pub(crate) struct RegisterForm {
    username: String,
    password: String,
    confirm: String,
    #[serde(default)]
    token: String,
}

pub(crate) async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ApiError> {
    if state.auth_backend != AuthBackendKind::Internal {
        return Ok(redirect("/login"));
    }
    let username = form.username.trim().to_lowercase();
    if username.is_empty() || form.password.is_empty() {
        return Ok(redirect_with_flash(
            "/register",
            vec![Flash::error("username and password are required")],
        ));
    }
    if form.password != form.confirm {
        return Ok(redirect_with_flash(
            "/register",
            vec![Flash::error("passwords do not match")],
        ));
    }

    // Bootstrap exception: the very first `admin` account may register
    // without a token, so a fresh install can be claimed. Past that point
    // an unset token means registration is closed, not open.
    let bootstrap = username == "admin" && state.store.user("admin")?.is_none();
    if !bootstrap {
        match state.registration_token() {
            Some(required) if form.token == required => {}
            Some(_) => {
                warn!(username, "registration refused: bad token");
                return Ok(redirect_with_flash(
                    "/register",
                    vec![Flash::error("invalid registration token")],
                ));
            }
            None => {
                warn!(username, "registration refused: no token configured");
                return Ok(redirect_with_flash(
                    "/register",
                    vec![Flash::error("registration is currently disabled")],
                ));
            }
        }
    }

    let hash = hash_password(&form.password)?;
    match state.store.create_user(&username, &hash) {
        Ok(()) => {}
        Err(StoreError::UsernameTaken(_)) => {
            return Ok(redirect_with_flash(
                "/register",
                vec![Flash::error("that username is already taken")],
            ));
        }
        Err(e) => return Err(e.into()),
    }
    if bootstrap {
        state.store.set_admin(&username, true)?;
        info!(username, "bootstrap admin account created");
    } else {
        info!(username, "account created");
    }
    Ok(redirect_with_flash(
        "/login",
        vec![Flash::success("account created, please sign in")],
    ))
}

pub(crate) async fn change_password_form(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(session) = session else {
        return Ok(redirect("/login"));
    };
    if session.source == AuthSource::Sso || state.auth_backend != AuthBackendKind::Internal {
        return Ok(redirect_with_flash(
            "/calendar",
            vec![Flash::error("passwords are managed by your identity provider")],
        ));
    }
    Ok(page(render::change_password_page(
        &flash::take(&headers),
        viewer(&state, &session),
    )))
}

#[derive(Deserialize)]
pub(crate) struct ChangePasswordForm {
    current: String,
    new: String,
    confirm: String,
}

pub(crate) async fn change_password_submit(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Response, ApiError> {
    let Some(session) = session else {
        return Ok(redirect("/login"));
    };
    if session.source == AuthSource::Sso || state.auth_backend != AuthBackendKind::Internal {
        return Ok(redirect_with_flash(
            "/calendar",
            vec![Flash::error("passwords are managed by your identity provider")],
        ));
    }
    if form.new.is_empty() || form.new != form.confirm {
        return Ok(redirect_with_flash(
            "/change-password",
            vec![Flash::error("new passwords do not match")],
        ));
    }
    let Some(user) = state.store.user(&session.username)? else {
        return Ok(redirect("/login"));
    };
    if !verify_password(&user.password_hash, &form.current) {
        return Ok(redirect_with_flash(
            "/change-password",
            vec![Flash::error("current password is incorrect")],
        ));
    }
    let hash = hash_password(&form.new)?;
    state.store.set_password_hash(&session.username, &hash)?;
    info!(username = session.username, "password changed");
    Ok(redirect_with_flash(
        "/calendar",
        vec![Flash::success("password changed")],
    ))
}
