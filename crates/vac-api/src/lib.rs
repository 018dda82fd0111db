mod error;
pub use error::ApiError;

mod flash;
mod handlers;
mod render;

mod http;
pub use http::router;

mod session;
pub use session::{CurrentUser, Session, SessionKeys};

mod state;
pub use state::{ApiOptions, AppState};
