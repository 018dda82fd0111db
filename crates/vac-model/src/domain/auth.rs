use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Which backend verifies interactive username/password logins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthBackendKind {
    /// Accounts stored in the application database.
    Internal,
    /// Local system accounts via PAM. The original deployment default.
    #[default]
    Pam,
}

impl AuthBackendKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuthBackendKind::Internal => "internal",
            AuthBackendKind::Pam => "pam",
        }
    }
}

impl fmt::Display for AuthBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthBackendKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "internal" => Ok(AuthBackendKind::Internal),
            "pam" => Ok(AuthBackendKind::Pam),
            other => Err(ModelError::UnknownAuthBackend(other.to_string())),
        }
    }
}

/// How the current session was established.
///
/// Recorded in the session cookie; password-change flows are refused for
/// `Sso` sessions because those accounts have no real local password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthSource {
    Internal,
    Pam,
    Sso,
}

impl AuthSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuthSource::Internal => "internal",
            AuthSource::Pam => "pam",
            AuthSource::Sso => "sso",
        }
    }
}

impl From<AuthBackendKind> for AuthSource {
    fn from(kind: AuthBackendKind) -> Self {
        match kind {
            AuthBackendKind::Internal => AuthSource::Internal,
            AuthBackendKind::Pam => AuthSource::Pam,
        }
    }
}

impl fmt::Display for AuthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthSource {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "internal" => Ok(AuthSource::Internal),
            "pam" => Ok(AuthSource::Pam),
            "sso" => Ok(AuthSource::Sso),
            other => Err(ModelError::UnknownAuthSource(other.to_string())),
        }
    }
}
