mod error;
pub use error::{StoreError, StoreResult};

mod schema;

mod store;
pub use store::Store;

mod bookings;
mod entra;
mod users;
