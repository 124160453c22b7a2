//! Minimal commercetools HTTP API client: client-credentials auth, product
//! reads, paginated product queries and version-guarded product updates.

mod client;
mod config;
mod error;
mod models;

pub use crate::client::CtpClient;
pub use crate::config::{CtpConfig, RetryConfig, REQUIRED_ENV};
pub use crate::error::CtpError;
pub use crate::models::*;
