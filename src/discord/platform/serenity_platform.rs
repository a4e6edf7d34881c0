// Serenity-backed implementation of the core `ChatPlatform` port.
//
// Holds the shared HTTP client handed out by the framework at setup, so the
// executor can be built once and reused across events.

use crate::core::actions::{ChatPlatform, PlatformError};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub struct SerenityPlatform {
    http: Arc<serenity::Http>,
}

impl SerenityPlatform {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

/// Map serenity failures onto the core taxonomy using the HTTP status when
/// there is one.
fn to_platform_error(err: serenity::Error) -> PlatformError {
    if let serenity::Error::Http(http_err) = &err {
        match http_err.status_code().map(|s| s.as_u16()) {
            Some(403) => return PlatformError::Forbidden,
            Some(404) => return PlatformError::NotFound,
            Some(429) => return PlatformError::RateLimited,
            _ => {}
        }
    }
    PlatformError::Other(err.to_string())
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError> {
        serenity::ChannelId::new(channel_id)
            .delete_message(&self.http, serenity::MessageId::new(message_id))
            .await
            .map_err(to_platform_error)
    }

    async fn send_to_channel(&self, channel_id: u64, content: &str) -> Result<(), PlatformError> {
        serenity::ChannelId::new(channel_id)
            .say(&self.http, content)
            .await
            .map(|_| ())
            .map_err(to_platform_error)
    }

    async fn send_to_user(&self, user_id: u64, content: &str) -> Result<(), PlatformError> {
        let dm_channel = serenity::UserId::new(user_id)
            .create_dm_channel(self.http.as_ref())
            .await
            .map_err(to_platform_error)?;

        dm_channel
            .say(&self.http, content)
            .await
            .map(|_| ())
            .map_err(to_platform_error)
    }
}
