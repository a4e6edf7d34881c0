// Pipeline models - the platform-neutral view of an inbound message and
// what the pipeline did with it.

use crate::core::actions::EnforcementOutcome;
use crate::core::moderation::ModerationDecision;

/// A message as the core sees it. Built by the Discord layer per event.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub message_id: u64,
    pub author_id: u64,
    pub author_name: String,
    pub channel_id: u64,
    /// `None` for direct messages
    pub guild_id: Option<u64>,
    pub content: String,
    pub attachment_urls: Vec<String>,
    pub author_is_bot: bool,
}

impl InboundMessage {
    pub fn is_direct(&self) -> bool {
        self.guild_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Author is a bot (including ourselves)
    IgnoredBot,
    /// DM from someone who is not a relay target
    IgnoredDirectMessage,
    /// Guild channel outside the watch list
    NotWatched,
    /// DM forwarded to the requester; counts delivered lines
    Relayed { requester_id: u64, delivered: usize },
    /// Evaluated and allowed through
    Passed(ModerationDecision),
    /// Evaluated as AI-generated and acted on
    Suppressed {
        decision: ModerationDecision,
        outcome: EnforcementOutcome,
    },
}
