use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use vac_auth::{AuthBackend, EntraClient, InternalBackend, password_backend};
use vac_core::metrics::{MetricsHandle, noop_metrics};
use vac_model::AuthBackendKind;
use vac_prometheus::PrometheusMetrics;
use vac_store::Store;

use crate::session::SessionKeys;

/// Everything the router needs, decided once at startup.
pub struct ApiOptions {
    /// Secret for signing session cookies.
    pub secret: String,
    /// Backend for username/password logins.
    pub auth_backend: AuthBackendKind,
    /// PAM service name, only relevant with the pam backend.
    pub pam_service: String,
    /// Usernames that are admins regardless of their database flag.
    pub admin_users: HashSet<String>,
    /// Registration token from the environment; the database value, when
    /// set, takes precedence.
    pub registration_token: Option<String>,
    /// External base URL, used to build the SSO redirect URI.
    pub public_url: String,
}

pub struct AppInner {
    pub store: Arc<Store>,
    pub keys: SessionKeys,
    pub password_auth: Arc<dyn AuthBackend>,
    pub entra: EntraClient,
    pub auth_backend: AuthBackendKind,
    pub admin_users: HashSet<String>,
    pub env_registration_token: Option<String>,
    pub public_url: String,
    pub metrics: MetricsHandle,
    pub prometheus: Option<Arc<PrometheusMetrics>>,
}

/// Shared handler state; cloning is an `Arc` bump.
#[derive(Clone)]
pub struct AppState(Arc<AppInner>);

impl Deref for AppState {
    type Target = AppInner;

    fn deref(&self) -> &AppInner {
        &self.0
    }
}

impl AppState {
    /// With `prometheus` set, requests and outcomes are recorded and
    /// `/metrics` serves the exposition; otherwise metrics are no-ops.
    pub fn new(
        store: Arc<Store>,
        options: ApiOptions,
        prometheus: Option<Arc<PrometheusMetrics>>,
    ) -> Self {
        let password_auth: Arc<dyn AuthBackend> = match options.auth_backend {
            AuthBackendKind::Internal => Arc::new(InternalBackend::new(store.clone())),
            AuthBackendKind::Pam => password_backend(options.pam_service),
        };
        let metrics: MetricsHandle = match &prometheus {
            Some(backend) => backend.clone(),
            None => noop_metrics(),
        };
        Self(Arc::new(AppInner {
            keys: SessionKeys::new(&options.secret),
            password_auth,
            entra: EntraClient::new(),
            auth_backend: options.auth_backend,
            admin_users: options.admin_users,
            env_registration_token: options.registration_token,
            public_url: options.public_url.trim_end_matches('/').to_string(),
            metrics,
            prometheus,
            store,
        }))
    }

    /// Whether this user gets the admin UI. Either the database flag or the
    /// environment override grants it.
    pub fn is_admin(&self, username: &str) -> bool {
        if self.admin_users.contains(username) {
            return true;
        }
        match self.store.user(username) {
            Ok(Some(user)) => user.is_admin,
            _ => false,
        }
    }

    /// The OAuth redirect URI registered with Entra.
    pub fn redirect_uri(&self) -> String {
        format!("{}/auth/entra/callback", self.public_url)
    }

    /// Token the registration form must present, if any. A non-empty value
    /// stored via the admin UI wins over the environment.
    pub fn registration_token(&self) -> Option<String> {
        let stored = self
            .store
            .entra_settings()
            .ok()
            .and_then(|s| s.registration_token)
            .filter(|t| !t.is_empty());
        stored.or_else(|| self.env_registration_token.clone())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use vac_model::EntraSettings;

    pub(crate) fn test_state() -> AppState {
        let store = Arc::new(Store::open_in_memory().unwrap());
        AppState::new(
            store,
            ApiOptions {
                secret: "test-secret".into(),
                auth_backend: AuthBackendKind::Internal,
                pam_service: "vacd".into(),
                admin_users: HashSet::from(["root-admin".to_string()]),
                registration_token: Some("env-token".into()),
                public_url: "https://vac.example/".into(),
            },
            None,
        )
    }

    pub(crate) fn test_state_with_prometheus() -> AppState {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let prometheus = Arc::new(PrometheusMetrics::new().unwrap());
        AppState::new(
            store,
            ApiOptions {
                secret: "test-secret".into(),
                auth_backend: AuthBackendKind::Internal,
                pam_service: "vacd".into(),
                admin_users: HashSet::new(),
                registration_token: None,
                public_url: "https://vac.example".into(),
            },
            Some(prometheus),
        )
    }

    #[test]
    fn trailing_slash_is_stripped_from_the_public_url() {
        let state = test_state();
        assert_eq!(state.redirect_uri(), "https://vac.example/auth/entra/callback");
    }

    #[test]
    fn admin_via_environment_or_database_flag() {
        let state = test_state();
        state.store.create_user("alice", "h").unwrap();
        assert!(!state.is_admin("alice"));
        state.store.set_admin("alice", true).unwrap();
        assert!(state.is_admin("alice"));
        assert!(state.is_admin("root-admin"));
        assert!(!state.is_admin("ghost"));
    }

    #[test]
    fn stored_registration_token_wins_over_the_environment() {
        let state = test_state();
        assert_eq!(state.registration_token().as_deref(), Some("env-token"));

        let mut settings = EntraSettings::default();
        settings.registration_token = Some("db-token".into());
        settings.client_secret = Some(String::new());
        state.store.update_entra_settings(&settings).unwrap();
        assert_eq!(state.registration_token().as_deref(), Some("db-token"));
    }
}
