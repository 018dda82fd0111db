//! Idempotent AWX controller setup for the vacation stack.

mod client;
pub use client::{AwxClient, Resource};

mod error;
pub use error::{AwxError, AwxResult};

pub mod setup;
