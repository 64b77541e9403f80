//! Image topic client for the account service.
//!
//! Profile image bytes are never stored here; uploads and deletes are
//! announced to an external image pipeline through a publish-style
//! interface. Delivery is best-effort: callers log failures and move on.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ImageTopicConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageAction {
    Upload,
    Delete,
}

/// Message published to the image topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMessage {
    pub action: ImageAction,
    pub image_id: String,
    pub image_folder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

#[async_trait]
pub trait ImagePublisher: Send + Sync {
    async fn publish(&self, message: ImageMessage) -> Result<(), anyhow::Error>;
}

/// Publishes image messages to the configured topic endpoint over HTTP.
pub struct HttpImagePublisher {
    client: reqwest::Client,
    topic_url: String,
    enabled: bool,
}

impl HttpImagePublisher {
    pub fn new(config: &ImageTopicConfig) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build image topic client: {}", e))?;

        tracing::info!(
            topic_url = %config.url,
            enabled = config.enabled,
            "Image topic client configured"
        );

        Ok(Self {
            client,
            topic_url: config.url.clone(),
            enabled: config.enabled,
        })
    }
}

#[async_trait]
impl ImagePublisher for HttpImagePublisher {
    async fn publish(&self, message: ImageMessage) -> Result<(), anyhow::Error> {
        if !self.enabled {
            tracing::debug!(image_id = %message.image_id, "Image topic disabled, dropping message");
            return Ok(());
        }

        self.client
            .post(&self.topic_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Image topic unreachable: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow::anyhow!("Image topic rejected message: {}", e))?;

        tracing::info!(
            action = ?message.action,
            image_id = %message.image_id,
            "Image message published"
        );
        Ok(())
    }
}

/// Recording publisher for tests.
#[derive(Default)]
pub struct MockImagePublisher {
    messages: Mutex<Vec<ImageMessage>>,
}

impl MockImagePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<ImageMessage> {
        self.messages.lock().expect("publisher lock poisoned").clone()
    }
}

#[async_trait]
impl ImagePublisher for MockImagePublisher {
    async fn publish(&self, message: ImageMessage) -> Result<(), anyhow::Error> {
        self.messages
            .lock()
            .expect("publisher lock poisoned")
            .push(message);
        Ok(())
    }
}
