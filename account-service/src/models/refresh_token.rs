use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use uuid::Uuid;

/// Refresh token record states. A record moves valid -> consumed exactly
/// once (rotation) or valid -> blacklisted (logout, cascade); consumed and
/// blacklisted are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Valid,
    Consumed,
    Blacklisted,
}

impl TokenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::Valid => "valid",
            TokenStatus::Consumed => "consumed",
            TokenStatus::Blacklisted => "blacklisted",
        }
    }
}

/// Stored record backing a refresh token. The record id doubles as the
/// token's `jti` claim; only a SHA-256 hash of the signed token is kept.
/// Records are never deleted, they form the rotation audit trail.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub status: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn new(id: Uuid, user_id: Uuid, token: &str, expires_in_days: i64) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            token_hash: Self::hash_token(token),
            status: TokenStatus::Valid.as_str().to_string(),
            issued_at: now,
            expires_at: now + Duration::days(expires_in_days),
        }
    }

    /// Hash a signed token with SHA-256 for storage and lookup comparison.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.status == TokenStatus::Valid.as_str() && !self.is_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_valid_and_hashes_the_token() {
        let record = RefreshTokenRecord::new(Uuid::new_v4(), Uuid::new_v4(), "token_abc", 7);

        assert_eq!(record.status, TokenStatus::Valid.as_str());
        assert_ne!(record.token_hash, "token_abc");
        assert_eq!(record.token_hash, RefreshTokenRecord::hash_token("token_abc"));
        assert!(record.is_valid());
    }

    #[test]
    fn expired_record_is_not_valid() {
        let mut record = RefreshTokenRecord::new(Uuid::new_v4(), Uuid::new_v4(), "token_abc", 7);

        assert!(!record.is_expired());

        record.expires_at = Utc::now() - Duration::seconds(1);
        assert!(record.is_expired());
        assert!(!record.is_valid());
    }

    #[test]
    fn consumed_and_blacklisted_records_are_not_valid() {
        let mut record = RefreshTokenRecord::new(Uuid::new_v4(), Uuid::new_v4(), "token_abc", 7);

        record.status = TokenStatus::Consumed.as_str().to_string();
        assert!(!record.is_valid());

        record.status = TokenStatus::Blacklisted.as_str().to_string();
        assert!(!record.is_valid());
    }
}
