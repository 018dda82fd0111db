mod backend;
pub use backend::{AuthBackend, InternalBackend, password_backend};

mod entra;
pub use entra::{EntraClient, authorize_url, claims_username};

mod error;
pub use error::{AuthError, AuthResult};

mod password;
pub use password::{hash_password, placeholder_hash, verify_password};
