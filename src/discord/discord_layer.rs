// Discord layer - commands, event handlers and the serenity-backed platform.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "moderation/message_events.rs"]
pub mod message_events;

#[path = "platform/serenity_platform.rs"]
pub mod platform;

use crate::core::pipeline::MessagePipeline;
use crate::core::relay::ConversationRouter;
use crate::infra::classifier::HuggingFaceClassifier;
use platform::SerenityPlatform;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Data that's shared across all commands and event handlers.
pub struct Data {
    pub pipeline: Arc<MessagePipeline<HuggingFaceClassifier, SerenityPlatform>>,
    pub relay: Arc<ConversationRouter>,
    pub presence: PresenceConfig,
}

/// What the bot shows as its activity once connected.
#[derive(Debug, Clone)]
pub struct PresenceConfig {
    pub name: String,
    pub url: String,
}
