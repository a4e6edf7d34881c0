// Discord-specific message handling - translates serenity messages into the
// core pipeline's types and logs what happened.

use crate::core::actions::EnforcementOutcome;
use crate::core::pipeline::{InboundMessage, PipelineOutcome};
use crate::discord::Data;
use poise::serenity_prelude as serenity;

/// Strip a serenity message down to what the core needs.
pub fn to_inbound(msg: &serenity::Message) -> InboundMessage {
    InboundMessage {
        message_id: msg.id.get(),
        author_id: msg.author.id.get(),
        author_name: msg.author.name.clone(),
        channel_id: msg.channel_id.get(),
        guild_id: msg.guild_id.map(|id| id.get()),
        content: msg.content.clone(),
        attachment_urls: msg.attachments.iter().map(|a| a.url.clone()).collect(),
        author_is_bot: msg.author.bot,
    }
}

/// Run a new message through detection or relay.
pub async fn handle_new_message(msg: &serenity::Message, data: &Data) -> PipelineOutcome {
    let inbound = to_inbound(msg);
    let outcome = data.pipeline.handle(&inbound).await;

    match &outcome {
        PipelineOutcome::Suppressed {
            outcome: EnforcementOutcome::DeleteFailed(e),
            ..
        } => {
            tracing::warn!(
                message_id = inbound.message_id,
                "AI-generated message could not be removed: {}",
                e
            );
        }
        PipelineOutcome::Suppressed { decision, .. } => {
            tracing::info!(
                author = %inbound.author_name,
                confidence = decision.confidence,
                "Removed AI-generated message"
            );
        }
        PipelineOutcome::Relayed {
            requester_id,
            delivered,
        } => {
            tracing::info!(
                from = inbound.author_id,
                to = requester_id,
                delivered,
                "Relayed DM reply"
            );
        }
        other => tracing::debug!(message_id = inbound.message_id, "Message handled: {:?}", other),
    }

    outcome
}
