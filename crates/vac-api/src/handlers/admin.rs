//! Admin surface: user management and SSO settings.

use axum::extract::{Form, Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use serde::Deserialize;
use tracing::info;

use vac_auth::hash_password;
use vac_model::EntraSettings;

use crate::error::ApiError;
use crate::flash::{self, Flash};
use crate::render;
use crate::session::{CurrentUser, Session};
use crate::state::AppState;

use super::{page, redirect, redirect_with_flash};

/// All admin handlers go through this gate; non-admins land on the
/// calendar.
fn require_admin(state: &AppState, session: Option<Session>) -> Result<Session, Response> {
    let Some(session) = session else {
        return Err(redirect("/login"));
    };
    if !state.is_admin(&session.username) {
        return Err(redirect_with_flash(
            "/calendar",
            vec![Flash::error("admin access required")],
        ));
    }
    Ok(session)
}

pub(crate) async fn users_page(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = match require_admin(&state, session) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let users = state.store.list_users()?;
    Ok(page(render::admin_users_page(
        &users,
        (session.username.as_str(), true),
        &flash::take(&headers),
    )))
}

#[derive(Deserialize)]
pub(crate) struct AdminActionForm {
    #[serde(default)]
    action: String,
}

/// The form states the wanted outcome, so a double submit converges
/// instead of flipping the flag back.
pub(crate) async fn set_admin_flag(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(username): Path<String>,
    Form(form): Form<AdminActionForm>,
) -> Result<Response, ApiError> {
    let session = match require_admin(&state, session) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let grant = match form.action.as_str() {
        "grant" => true,
        "revoke" => false,
        _ => {
            return Ok(redirect_with_flash(
                "/admin/users",
                vec![Flash::error("unknown admin action")],
            ));
        }
    };
    if !state.store.set_admin(&username, grant)? {
        return Ok(redirect_with_flash(
            "/admin/users",
            vec![Flash::error("no such user")],
        ));
    }
    info!(username, grant, by = session.username, "admin flag changed");
    let message = if grant {
        format!("{username} is now an admin")
    } else {
        format!("{username} is no longer an admin")
    };
    Ok(redirect_with_flash(
        "/admin/users",
        vec![Flash::success(message)],
    ))
}

pub(crate) async fn password_form(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = match require_admin(&state, session) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    if state.store.user(&username)?.is_none() {
        return Ok(redirect_with_flash(
            "/admin/users",
            vec![Flash::error("no such user")],
        ));
    }
    Ok(page(render::admin_password_page(
        &username,
        (session.username.as_str(), true),
        &flash::take(&headers),
    )))
}

#[derive(Deserialize)]
pub(crate) struct SetPasswordForm {
    new: String,
    confirm: String,
}

pub(crate) async fn password_submit(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(username): Path<String>,
    Form(form): Form<SetPasswordForm>,
) -> Result<Response, ApiError> {
    let session = match require_admin(&state, session) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let back = format!("/admin/users/{username}/password");
    if form.new.is_empty() || form.new != form.confirm {
        return Ok(redirect_with_flash(
            &back,
            vec![Flash::error("passwords do not match")],
        ));
    }
    let hash = hash_password(&form.new)?;
    if !state.store.set_password_hash(&username, &hash)? {
        return Ok(redirect_with_flash(
            "/admin/users",
            vec![Flash::error("no such user")],
        ));
    }
    info!(username, by = session.username, "password set by admin");
    Ok(redirect_with_flash(
        "/admin/users",
        vec![Flash::success(format!("password updated for {username}"))],
    ))
}

pub(crate) async fn delete_form(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = match require_admin(&state, session) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    if username == session.username {
        return Ok(redirect_with_flash(
            "/admin/users",
            vec![Flash::error("you cannot delete your own account")],
        ));
    }
    if state.store.user(&username)?.is_none() {
        return Ok(redirect_with_flash(
            "/admin/users",
            vec![Flash::error("no such user")],
        ));
    }
    Ok(page(render::admin_delete_page(
        &username,
        (session.username.as_str(), true),
        &flash::take(&headers),
    )))
}

#[derive(Deserialize)]
pub(crate) struct DeleteUserForm {
    #[serde(default)]
    confirm: String,
}

pub(crate) async fn delete_submit(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(username): Path<String>,
    Form(form): Form<DeleteUserForm>,
) -> Result<Response, ApiError> {
    let session = match require_admin(&state, session) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    if username == session.username {
        return Ok(redirect_with_flash(
            "/admin/users",
            vec![Flash::error("you cannot delete your own account")],
        ));
    }
    if form.confirm.trim() != "delete" {
        return Ok(redirect_with_flash(
            &format!("/admin/users/{username}/delete"),
            vec![Flash::error("type delete to confirm")],
        ));
    }
    if !state.store.delete_user(&username)? {
        return Ok(redirect_with_flash(
            "/admin/users",
            vec![Flash::error("no such user")],
        ));
    }
    info!(username, by = session.username, "user deleted");
    Ok(redirect_with_flash(
        "/admin/users",
        vec![Flash::success(format!("{username} deleted"))],
    ))
}

pub(crate) async fn entra_form(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = match require_admin(&state, session) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let settings = state.store.entra_settings()?;
    Ok(page(render::admin_entra_page(
        &settings,
        (session.username.as_str(), true),
        &flash::take(&headers),
    )))
}

#[derive(Deserialize)]
pub(crate) struct EntraForm {
    #[serde(default)]
    enabled: Option<String>,
    #[serde(default)]
    tenant_id: String,
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    client_secret: String,
    #[serde(default)]
    registration_token: String,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub(crate) async fn entra_submit(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Form(form): Form<EntraForm>,
) -> Result<Response, ApiError> {
    let session = match require_admin(&state, session) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let enabled = form.enabled.is_some();
    let tenant_id = non_empty(form.tenant_id);
    let client_id = non_empty(form.client_id);
    if enabled && (tenant_id.is_none() || client_id.is_none()) {
        return Ok(redirect_with_flash(
            "/admin/entra",
            vec![Flash::error("tenant id and client id are required to enable sso")],
        ));
    }
    // A blank secret keeps the stored one.
    let settings = EntraSettings {
        tenant_id,
        client_id,
        client_secret: non_empty(form.client_secret),
        enabled,
        registration_token: non_empty(form.registration_token),
    };
    state.store.update_entra_settings(&settings)?;
    info!(enabled, by = session.username, "sso settings updated");
    Ok(redirect_with_flash(
        "/admin/entra",
        vec![Flash::success("settings saved")],
    ))
}
