//! service-core: Shared infrastructure for the account platform services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use tracing;
pub use validator;

pub use error::AppError;
