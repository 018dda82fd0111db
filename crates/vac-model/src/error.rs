use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown half-day value: {0}")]
    UnknownHalf(String),

    #[error("unknown slot kind: {0}")]
    UnknownSlot(String),

    #[error("unknown auth backend: {0}")]
    UnknownAuthBackend(String),

    #[error("unknown auth source: {0}")]
    UnknownAuthSource(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("end date {end} is before start date {start}")]
    InvalidRange { start: String, end: String },
}

pub type ModelResult<T> = Result<T, ModelError>;
