use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::User;
use crate::services::ServiceError;

const ACCESS_TOKEN_TYPE: &str = "access";
const REFRESH_TOKEN_TYPE: &str = "refresh";

/// JWT service for token generation and validation (HS256, server-held key).
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry_minutes: i64,
    refresh_token_expiry_days: i64,
}

/// Claims for access tokens (short-lived, stateless).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user id)
    pub sub: String,
    /// Staff flag, consumed by the access evaluator
    pub is_staff: bool,
    /// Discriminates access from refresh tokens
    pub token_type: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT id
    pub jti: String,
}

/// Claims for refresh tokens (long-lived, single-use).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// Subject (user id)
    pub sub: String,
    /// Discriminates refresh from access tokens
    pub token_type: String,
    /// Uniqueness nonce, matches the stored record id
    pub jti: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        if config.signing_key.is_empty() {
            return Err(anyhow::anyhow!("JWT signing key must not be empty"));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.signing_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.signing_key.as_bytes()),
            access_token_expiry_minutes: config.access_token_expiry_minutes,
            refresh_token_expiry_days: config.refresh_token_expiry_days,
        })
    }

    /// Generate an access token embedding the user's id and staff flag.
    pub fn generate_access_token(&self, user: &User) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.access_token_expiry_minutes);

        let claims = AccessTokenClaims {
            sub: user.id.to_string(),
            is_staff: user.is_staff,
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Failed to encode token: {}", e)))
    }

    /// Generate a refresh token whose `jti` is the stored record id.
    pub fn generate_refresh_token(
        &self,
        user_id: &str,
        record_id: &str,
    ) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now + Duration::days(self.refresh_token_expiry_days);

        let claims = RefreshTokenClaims {
            sub: user_id.to_string(),
            token_type: REFRESH_TOKEN_TYPE.to_string(),
            jti: record_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Failed to encode token: {}", e)))
    }

    /// Validate and decode an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, ServiceError> {
        let claims =
            decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation())
                .map_err(map_decode_error)?
                .claims;

        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(ServiceError::TokenInvalid);
        }
        Ok(claims)
    }

    /// Validate and decode a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims, ServiceError> {
        let claims =
            decode::<RefreshTokenClaims>(token, &self.decoding_key, &self.validation())
                .map_err(map_decode_error)?
                .claims;

        if claims.token_type != REFRESH_TOKEN_TYPE {
            return Err(ServiceError::TokenInvalid);
        }
        Ok(claims)
    }

    pub fn refresh_token_expiry_days(&self) -> i64 {
        self.refresh_token_expiry_days
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> ServiceError {
    match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => ServiceError::TokenExpired,
        _ => ServiceError::TokenInvalid,
    }
}
