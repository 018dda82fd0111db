use thiserror::Error;

#[derive(Debug, Error)]
pub enum AwxError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("awx rejected the request to {endpoint}: status {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("no usable inventory found on the controller")]
    NoInventory,
}

pub type AwxResult<T> = Result<T, AwxError>;
