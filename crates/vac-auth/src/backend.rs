use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use vac_store::Store;

use crate::error::AuthResult;
use crate::password::verify_password;

/// Verifies interactive username/password logins.
///
/// The HTTP layer holds one of these behind a trait object; which
/// implementation it gets is decided once at startup from the daemon
/// config.
#[async_trait]
pub trait AuthBackend: Send + Sync + 'static {
    /// Check the credentials. `Ok(false)` is a normal wrong-password
    /// outcome; `Err` means the backend itself failed.
    async fn verify(&self, username: &str, password: &str) -> AuthResult<bool>;
}

/// Accounts stored in the application database.
pub struct InternalBackend {
    store: Arc<Store>,
}

impl InternalBackend {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthBackend for InternalBackend {
    async fn verify(&self, username: &str, password: &str) -> AuthResult<bool> {
        let Some(user) = self.store.user(username)? else {
            return Ok(false);
        };
        Ok(verify_password(&user.password_hash, password))
    }
}

/// Build the PAM-based backend, or a refusing stand-in when the `pam`
/// feature is compiled out. The original deployment refused all logins when
/// its PAM module was missing; this keeps that behavior.
pub fn password_backend(service: impl Into<String>) -> Arc<dyn AuthBackend> {
    #[cfg(feature = "pam")]
    {
        Arc::new(pam_backend::PamBackend::new(service))
    }
    #[cfg(not(feature = "pam"))]
    {
        let _ = service.into();
        Arc::new(PamUnavailable)
    }
}

#[cfg(not(feature = "pam"))]
struct PamUnavailable;

#[cfg(not(feature = "pam"))]
#[async_trait]
impl AuthBackend for PamUnavailable {
    async fn verify(&self, username: &str, _password: &str) -> AuthResult<bool> {
        warn!(username, "pam support not compiled in; refusing login");
        Ok(false)
    }
}

#[cfg(feature = "pam")]
mod pam_backend {
    use super::*;

    /// Local system accounts via PAM.
    pub struct PamBackend {
        service: String,
    }

    impl PamBackend {
        pub fn new(service: impl Into<String>) -> Self {
            Self {
                service: service.into(),
            }
        }
    }

    #[async_trait]
    impl AuthBackend for PamBackend {
        async fn verify(&self, username: &str, password: &str) -> AuthResult<bool> {
            let mut authenticator = match pam::Authenticator::with_password(&self.service) {
                Ok(a) => a,
                Err(e) => {
                    warn!(service = %self.service, error = %e, "pam service unavailable");
                    return Ok(false);
                }
            };
            authenticator
                .get_handler()
                .set_credentials(username, password);
            match authenticator.authenticate() {
                Ok(()) => Ok(true),
                Err(e) => {
                    warn!(username, service = %self.service, reason = %e, "pam authentication failed");
                    Ok(false)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::hash_password;

    #[tokio::test]
    async fn internal_backend_accepts_good_credentials() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        store
            .create_user("alice", &hash_password("secret").unwrap())
            .unwrap();

        let backend = InternalBackend::new(store);
        assert!(backend.verify("alice", "secret").await.unwrap());
        assert!(!backend.verify("alice", "wrong").await.unwrap());
        assert!(!backend.verify("nobody", "secret").await.unwrap());
    }

    #[cfg(not(feature = "pam"))]
    #[tokio::test]
    async fn stand_in_backend_refuses_everything() {
        let backend = password_backend("login");
        assert!(!backend.verify("root", "toor").await.unwrap());
    }
}
