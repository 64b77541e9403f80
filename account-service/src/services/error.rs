use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token is invalid")]
    TokenInvalid,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is blacklisted")]
    TokenBlacklisted,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("User not found")]
    UserNotFound,

    #[error("A user with that email already exists")]
    EmailTaken,

    #[error("A user with that username already exists")]
    UsernameTaken,

    #[error("profile_image is not valid base64")]
    InvalidImage,

    #[error("Database error: {0}")]
    Database(anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            // Unknown principal and bad secret are indistinguishable on the
            // wire so the endpoint cannot be used to enumerate accounts.
            ServiceError::InvalidCredentials => AppError::Unauthorized {
                code: "no_active_account",
                detail: "No active account found with the given credentials".to_string(),
            },
            ServiceError::TokenInvalid => AppError::Unauthorized {
                code: "token_not_valid",
                detail: "Token is invalid".to_string(),
            },
            ServiceError::TokenExpired => AppError::Unauthorized {
                code: "token_not_valid",
                detail: "Token is expired".to_string(),
            },
            ServiceError::TokenBlacklisted => AppError::Unauthorized {
                code: "token_not_valid",
                detail: "Token is blacklisted".to_string(),
            },
            ServiceError::PermissionDenied => AppError::Forbidden(
                "You do not have permission to perform this action".to_string(),
            ),
            ServiceError::UserNotFound => {
                AppError::NotFound(anyhow::anyhow!("User not found"))
            }
            ServiceError::EmailTaken => {
                AppError::Conflict(anyhow::anyhow!("A user with that email already exists"))
            }
            ServiceError::UsernameTaken => {
                AppError::Conflict(anyhow::anyhow!("A user with that username already exists"))
            }
            ServiceError::InvalidImage => {
                AppError::BadRequest(anyhow::anyhow!("profile_image is not valid base64"))
            }
            ServiceError::Database(e) => AppError::Database(e),
            ServiceError::Internal(e) => AppError::Internal(e),
        }
    }
}
