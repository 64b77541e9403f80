//! User CRUD with uniqueness checks and image side effects.

use std::sync::Arc;

use base64::Engine;
use uuid::Uuid;

use crate::{
    dtos::user::{CreateUserRequest, UpdateUserRequest},
    models::User,
    services::{ImageAction, ImageMessage, ImagePublisher, ServiceError},
    store::{RefreshTokenStore, UserStore},
    utils::hash_password,
};

/// Folder key the image pipeline files profile images under.
const PROFILE_FOLDER: &str = "profile";

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn RefreshTokenStore>,
    images: Arc<dyn ImagePublisher>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn RefreshTokenStore>,
        images: Arc<dyn ImagePublisher>,
    ) -> Self {
        Self {
            users,
            tokens,
            images,
        }
    }

    pub async fn create(&self, req: CreateUserRequest) -> Result<User, ServiceError> {
        if self
            .users
            .find_by_email(&req.email)
            .await
            .map_err(ServiceError::Database)?
            .is_some()
        {
            return Err(ServiceError::EmailTaken);
        }
        if self
            .users
            .find_by_username(&req.username)
            .await
            .map_err(ServiceError::Database)?
            .is_some()
        {
            return Err(ServiceError::UsernameTaken);
        }

        let password_hash = hash_password(&req.password)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Password hashing error: {}", e)))?;

        let mut user = User::new(req.username, req.email, password_hash);
        user.first_name = req.first_name;
        user.last_name = req.last_name;

        if let Some(image_base64) = req.profile_image {
            user.profile_image_id = Some(self.publish_upload(image_base64).await?);
        }

        self.users
            .insert(&user)
            .await
            .map_err(ServiceError::Database)?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>, ServiceError> {
        self.users.list().await.map_err(ServiceError::Database)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ServiceError> {
        self.users
            .find_by_id(id)
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::UserNotFound)
    }

    pub async fn update(&self, id: Uuid, req: UpdateUserRequest) -> Result<User, ServiceError> {
        let mut user = self.get(id).await?;

        if let Some(email) = req.email {
            if email != user.email {
                if self
                    .users
                    .find_by_email(&email)
                    .await
                    .map_err(ServiceError::Database)?
                    .is_some()
                {
                    return Err(ServiceError::EmailTaken);
                }
                user.email = email;
            }
        }

        if let Some(username) = req.username {
            if username != user.username {
                if self
                    .users
                    .find_by_username(&username)
                    .await
                    .map_err(ServiceError::Database)?
                    .is_some()
                {
                    return Err(ServiceError::UsernameTaken);
                }
                user.username = username;
            }
        }

        if let Some(first_name) = req.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = req.last_name {
            user.last_name = Some(last_name);
        }

        if let Some(password) = req.password {
            user.password_hash = hash_password(&password).map_err(|e| {
                ServiceError::Internal(anyhow::anyhow!("Password hashing error: {}", e))
            })?;
        }

        if let Some(image_base64) = req.profile_image {
            // replacing an image retires the previous one first
            if let Some(old_image_id) = user.profile_image_id {
                self.publish_delete(old_image_id).await;
            }
            user.profile_image_id = Some(self.publish_upload(image_base64).await?);
        }

        user.updated_at = chrono::Utc::now();

        if !self
            .users
            .update(&user)
            .await
            .map_err(ServiceError::Database)?
        {
            return Err(ServiceError::UserNotFound);
        }

        tracing::info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let user = self.get(id).await?;

        if !self
            .users
            .delete(id)
            .await
            .map_err(ServiceError::Database)?
        {
            return Err(ServiceError::UserNotFound);
        }

        let revoked = self
            .tokens
            .blacklist_all_for_user(id)
            .await
            .map_err(ServiceError::Database)?;

        if let Some(image_id) = user.profile_image_id {
            self.publish_delete(image_id).await;
        }

        tracing::info!(user_id = %id, revoked_tokens = revoked, "User deleted");
        Ok(())
    }

    /// Announce a new image to the pipeline and return its assigned id.
    /// The payload is checked to be decodable before anything is published.
    async fn publish_upload(&self, image_base64: String) -> Result<Uuid, ServiceError> {
        base64::engine::general_purpose::STANDARD
            .decode(image_base64.as_bytes())
            .map_err(|_| ServiceError::InvalidImage)?;

        let image_id = Uuid::new_v4();
        self.publish_best_effort(ImageMessage {
            action: ImageAction::Upload,
            image_id: image_id.to_string(),
            image_folder: PROFILE_FOLDER.to_string(),
            image_base64: Some(image_base64),
        })
        .await;

        Ok(image_id)
    }

    async fn publish_delete(&self, image_id: Uuid) {
        self.publish_best_effort(ImageMessage {
            action: ImageAction::Delete,
            image_id: image_id.to_string(),
            image_folder: PROFILE_FOLDER.to_string(),
            image_base64: None,
        })
        .await;
    }

    /// Publish failures never abort the enclosing account mutation.
    async fn publish_best_effort(&self, message: ImageMessage) {
        let action = message.action;
        let image_id = message.image_id.clone();
        if let Err(e) = self.images.publish(message).await {
            tracing::warn!(
                error = %e,
                action = ?action,
                image_id = %image_id,
                "Image publish failed, continuing"
            );
        }
    }
}
