// Action executor - turns core decisions into platform side effects.
//
// Everything here talks to the chat platform through the `ChatPlatform`
// port, so the same logic runs against serenity in production and a
// recording mock in tests. Failures are logged and reported as outcomes;
// nothing here is allowed to take down the event handler.

use crate::core::moderation::ModerationDecision;
use crate::core::pipeline::InboundMessage;
use crate::core::relay::{ConversationRouter, RelayNotification};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Notice posted after an AI-generated message is removed.
pub const DEFAULT_NOTICE_TEMPLATE: &str = "{mention}, Your Message has now been... TERMINATED! https://tenor.com/view/tyrminator-tyr-bot-redeye-gif-22046800";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlatformError {
    #[error("Missing permissions")]
    Forbidden,

    #[error("Resource not found")]
    NotFound,

    #[error("Rate limited")]
    RateLimited,

    #[error("Platform error: {0}")]
    Other(String),
}

/// Errors surfaced back to the operator who ran a command.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("I don't have permission to send messages in that channel.")]
    PermissionDenied,

    #[error("They might have DMs disabled.")]
    RecipientUnreachable,

    #[error("{0}")]
    Platform(#[from] PlatformError),
}

// ============================================================================
// PLATFORM TRAIT (PORT)
// ============================================================================

/// The slice of the chat platform the core needs.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError>;

    async fn send_to_channel(&self, channel_id: u64, content: &str) -> Result<(), PlatformError>;

    /// Send a direct message, opening the DM channel if needed.
    async fn send_to_user(&self, user_id: u64, content: &str) -> Result<(), PlatformError>;
}

// ============================================================================
// OUTCOMES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum EnforcementOutcome {
    /// Decision did not ask for suppression
    NotSuppressed,
    /// Message deleted; `notice_posted` is false if the notice send failed
    Removed { notice_posted: bool },
    /// Deletion failed, so no notice was posted either
    DeleteFailed(PlatformError),
}

// ============================================================================
// EXECUTOR
// ============================================================================

pub struct ActionExecutor<P: ChatPlatform> {
    platform: P,
    router: Arc<ConversationRouter>,
    notice_template: String,
}

impl<P: ChatPlatform> ActionExecutor<P> {
    pub fn new(platform: P, router: Arc<ConversationRouter>, notice_template: String) -> Self {
        Self {
            platform,
            router,
            notice_template,
        }
    }

    #[cfg(test)]
    pub(crate) fn platform(&self) -> &P {
        &self.platform
    }

    /// Render the removal notice for an author.
    pub fn notice_for(&self, author_id: u64) -> String {
        self.notice_template
            .replace("{mention}", &format!("<@{}>", author_id))
    }

    /// Delete a suppressed message and announce it in the same channel.
    ///
    /// If the delete fails the notice is skipped: announcing a removal that
    /// didn't happen would only confuse the channel.
    pub async fn enforce(
        &self,
        message: &InboundMessage,
        decision: &ModerationDecision,
    ) -> EnforcementOutcome {
        if !decision.suppress {
            return EnforcementOutcome::NotSuppressed;
        }

        if let Err(e) = self
            .platform
            .delete_message(message.channel_id, message.message_id)
            .await
        {
            tracing::warn!(
                message_id = message.message_id,
                channel_id = message.channel_id,
                "Failed to delete AI-generated message: {}",
                e
            );
            return EnforcementOutcome::DeleteFailed(e);
        }

        let notice = self.notice_for(message.author_id);
        let notice_posted = match self
            .platform
            .send_to_channel(message.channel_id, &notice)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to send removal notice: {}", e);
                false
            }
        };

        EnforcementOutcome::Removed { notice_posted }
    }

    /// Forward a relayed reply to its requester. Returns how many lines were
    /// delivered.
    pub async fn forward_reply(&self, notification: &RelayNotification) -> usize {
        let mut delivered = 0;
        for line in &notification.lines {
            match self
                .platform
                .send_to_user(notification.requester_id, line)
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    requester_id = notification.requester_id,
                    "Failed to forward relayed reply: {}",
                    e
                ),
            }
        }
        delivered
    }

    /// Operator "send to channel" command.
    ///
    /// `bot_can_send` is resolved by the caller from the platform's
    /// permission model; the send is never attempted without it.
    pub async fn send_to_channel(
        &self,
        channel_id: u64,
        content: &str,
        bot_can_send: bool,
    ) -> Result<(), CommandError> {
        if !bot_can_send {
            return Err(CommandError::PermissionDenied);
        }

        self.platform
            .send_to_channel(channel_id, content)
            .await
            .map_err(|e| match e {
                PlatformError::Forbidden => CommandError::PermissionDenied,
                other => CommandError::Platform(other),
            })
    }

    /// Operator "DM relay" command: DM the target, then route their replies
    /// back to the requester. Nothing is registered if the DM fails.
    pub async fn send_direct(
        &self,
        requester_id: u64,
        target_id: u64,
        content: &str,
    ) -> Result<(), CommandError> {
        self.platform
            .send_to_user(target_id, content)
            .await
            .map_err(|e| match e {
                PlatformError::Forbidden => CommandError::RecipientUnreachable,
                other => CommandError::Platform(other),
            })?;

        self.router.register(requester_id, target_id);
        tracing::info!(requester_id, target_id, "DM relay registered");
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
