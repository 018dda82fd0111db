use serde::{Deserialize, Serialize};

/// Entra ID (Azure AD) SSO settings, stored as a singleton row and managed
/// from the admin UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntraSettings {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub enabled: bool,
    /// Token required on the registration form. Falls back to the daemon
    /// environment when unset.
    pub registration_token: Option<String>,
}

impl EntraSettings {
    /// SSO can be offered only when enabled and fully configured.
    pub fn sso_ready(&self) -> bool {
        self.enabled
            && self.tenant_id.as_deref().is_some_and(|s| !s.is_empty())
            && self.client_id.as_deref().is_some_and(|s| !s.is_empty())
            && self.client_secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_ready() {
        assert!(!EntraSettings::default().sso_ready());
    }

    #[test]
    fn ready_needs_all_three_ids() {
        let mut settings = EntraSettings {
            tenant_id: Some("tenant".into()),
            client_id: Some("client".into()),
            client_secret: Some("secret".into()),
            enabled: true,
            registration_token: None,
        };
        assert!(settings.sso_ready());

        settings.client_secret = Some(String::new());
        assert!(!settings.sso_ready());

        settings.client_secret = Some("secret".into());
        settings.enabled = false;
        assert!(!settings.sso_ready());
    }
}
