use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("store error: {0}")]
    Store(#[from] vac_store::StoreError),

    #[error("sso is not configured")]
    SsoNotConfigured,

    #[error("token endpoint request failed: {0}")]
    TokenRequest(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    TokenRejected { status: u16, body: String },

    #[error("identity token missing from token response")]
    MissingIdToken,

    #[error("identity token could not be decoded: {0}")]
    TokenDecode(#[from] jsonwebtoken::errors::Error),

    #[error("identity token carries no usable username")]
    MissingUsername,

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type AuthResult<T> = Result<T, AuthError>;
