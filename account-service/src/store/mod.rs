//! Storage abstraction for accounts and refresh token records.
//!
//! Handlers and services only see the traits; `PgStore` backs production
//! and `MemoryStore` backs the test suite and local runs without Postgres.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{RefreshTokenRecord, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &User) -> Result<(), anyhow::Error>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, anyhow::Error>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, anyhow::Error>;
    async fn list(&self) -> Result<Vec<User>, anyhow::Error>;
    /// Persist the given snapshot. Returns false if the user no longer exists.
    async fn update(&self, user: &User) -> Result<bool, anyhow::Error>;
    async fn delete(&self, id: Uuid) -> Result<bool, anyhow::Error>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), anyhow::Error>;
    async fn find(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, anyhow::Error>;

    /// Transition the record valid -> consumed as a single conditional
    /// write. Returns the record only when this call performed the
    /// transition; under concurrent replay at most one caller wins.
    async fn consume(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, anyhow::Error>;

    /// Transition the record valid -> blacklisted. Returns false when the
    /// record was absent or already terminal.
    async fn blacklist(&self, id: Uuid) -> Result<bool, anyhow::Error>;

    /// Blacklist every still-valid record of a user. Returns the number of
    /// records transitioned.
    async fn blacklist_all_for_user(&self, user_id: Uuid) -> Result<u64, anyhow::Error>;
}
