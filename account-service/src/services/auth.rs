//! Credential verification and the refresh token lifecycle.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    dtos::auth::TokenPairResponse,
    models::{RefreshTokenRecord, User},
    services::{JwtService, ServiceError},
    store::{RefreshTokenStore, UserStore},
    utils::{hash_password, verify_password},
};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn RefreshTokenStore>,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn RefreshTokenStore>,
        jwt: JwtService,
    ) -> Self {
        Self { users, tokens, jwt }
    }

    /// Check an email/password pair against the stored account.
    ///
    /// Unknown emails and wrong passwords both come back as
    /// `InvalidCredentials`; the unknown-email path still burns an Argon2
    /// hash so its timing profile matches a real verification.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, ServiceError> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(ServiceError::Database)?;

        let Some(user) = user else {
            let _ = hash_password(password);
            return Err(ServiceError::InvalidCredentials);
        };

        verify_password(password, &user.password_hash)
            .map_err(|_| ServiceError::InvalidCredentials)?;

        Ok(user)
    }

    /// Mint an access/refresh pair for a verified user and record the
    /// refresh token as valid. Every issuance gets a fresh record id, so
    /// two pairs never share a refresh token value.
    pub async fn issue(&self, user: &User) -> Result<TokenPairResponse, ServiceError> {
        let access = self.jwt.generate_access_token(user)?;

        let record_id = Uuid::new_v4();
        let refresh = self
            .jwt
            .generate_refresh_token(&user.id.to_string(), &record_id.to_string())?;

        let record = RefreshTokenRecord::new(
            record_id,
            user.id,
            &refresh,
            self.jwt.refresh_token_expiry_days(),
        );
        self.tokens
            .insert(&record)
            .await
            .map_err(ServiceError::Database)?;

        Ok(TokenPairResponse { access, refresh })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPairResponse, ServiceError> {
        let user = self.verify_credentials(email, password).await?;

        tracing::info!(user_id = %user.id, "Issuing token pair");
        self.issue(&user).await
    }

    /// Rotate a refresh token: validate it, consume the backing record
    /// (valid -> consumed, single conditional write) and issue a new pair.
    /// Replaying a consumed or blacklisted token fails with
    /// `TokenBlacklisted`; under concurrent replay at most one caller wins.
    pub async fn rotate(&self, refresh_token: &str) -> Result<TokenPairResponse, ServiceError> {
        let claims = self.jwt.validate_refresh_token(refresh_token)?;
        let record_id = Uuid::parse_str(&claims.jti).map_err(|_| ServiceError::TokenInvalid)?;

        let record = self
            .tokens
            .find(record_id)
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::TokenInvalid)?;

        if record.user_id.to_string() != claims.sub {
            return Err(ServiceError::TokenInvalid);
        }
        if record.token_hash != RefreshTokenRecord::hash_token(refresh_token) {
            tracing::warn!(user_id = %claims.sub, "Refresh token hash mismatch");
            return Err(ServiceError::TokenInvalid);
        }
        if record.is_expired() {
            return Err(ServiceError::TokenExpired);
        }

        if self
            .tokens
            .consume(record_id)
            .await
            .map_err(ServiceError::Database)?
            .is_none()
        {
            return Err(ServiceError::TokenBlacklisted);
        }

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| ServiceError::TokenInvalid)?;
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::TokenInvalid)?;

        tracing::info!(user_id = %user.id, "Refresh token rotated");
        self.issue(&user).await
    }

    /// Blacklist a refresh token (valid -> blacklisted) on explicit logout.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ServiceError> {
        let claims = self.jwt.validate_refresh_token(refresh_token)?;
        let record_id = Uuid::parse_str(&claims.jti).map_err(|_| ServiceError::TokenInvalid)?;

        let revoked = self
            .tokens
            .blacklist(record_id)
            .await
            .map_err(ServiceError::Database)?;
        if !revoked {
            return Err(ServiceError::TokenBlacklisted);
        }

        tracing::info!(user_id = %claims.sub, "Refresh token revoked");
        Ok(())
    }
}
