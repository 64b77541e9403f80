//! Services layer for the account service.
//!
//! Credential verification, the token lifecycle, access evaluation, user
//! CRUD and the image topic client.

mod auth;
pub mod error;
mod image_client;
mod jwt;
pub mod policy;
mod users;

pub use auth::AuthService;
pub use error::ServiceError;
pub use image_client::{
    HttpImagePublisher, ImageAction, ImageMessage, ImagePublisher, MockImagePublisher,
};
pub use jwt::{AccessTokenClaims, JwtService, RefreshTokenClaims};
pub use users::UserService;
