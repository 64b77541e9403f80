//! In-memory store used by the test suite and for running without Postgres.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{RefreshTokenRecord, TokenStatus, User};

use super::{RefreshTokenStore, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    tokens: DashMap<Uuid, RefreshTokenRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), anyhow::Error> {
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, anyhow::Error> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, anyhow::Error> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.clone()))
    }

    async fn list(&self) -> Result<Vec<User>, anyhow::Error> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update(&self, user: &User) -> Result<bool, anyhow::Error> {
        match self.users.get_mut(&user.id) {
            Some(mut entry) => {
                *entry = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        Ok(self.users.remove(&id).is_some())
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), anyhow::Error> {
        self.tokens.insert(record.id, record.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, anyhow::Error> {
        Ok(self.tokens.get(&id).map(|r| r.clone()))
    }

    async fn consume(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, anyhow::Error> {
        // get_mut holds the shard lock, making the check-and-set atomic
        if let Some(mut entry) = self.tokens.get_mut(&id) {
            if entry.status == TokenStatus::Valid.as_str() {
                entry.status = TokenStatus::Consumed.as_str().to_string();
                return Ok(Some(entry.clone()));
            }
        }
        Ok(None)
    }

    async fn blacklist(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        if let Some(mut entry) = self.tokens.get_mut(&id) {
            if entry.status == TokenStatus::Valid.as_str() {
                entry.status = TokenStatus::Blacklisted.as_str().to_string();
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn blacklist_all_for_user(&self, user_id: Uuid) -> Result<u64, anyhow::Error> {
        let mut transitioned = 0;
        for mut entry in self.tokens.iter_mut() {
            if entry.user_id == user_id && entry.status == TokenStatus::Valid.as_str() {
                entry.status = TokenStatus::Blacklisted.as_str().to_string();
                transitioned += 1;
            }
        }
        Ok(transitioned)
    }
}
