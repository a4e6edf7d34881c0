// This module handles bot presence and lifecycle events.
//
// Everything here is Discord-layer glue: it only works with Discord SDK
// types (Context, ActivityData, OnlineStatus).

use crate::discord::PresenceConfig;
use poise::serenity_prelude as serenity;

/// Show the bot as idle and "streaming" its watch duty.
///
/// Streaming activities need a valid URL; if the configured one is rejected
/// we fall back to a plain "playing" activity with the same name.
pub fn set_watching_status(ctx: &serenity::Context, presence: &PresenceConfig) {
    let activity = match serenity::ActivityData::streaming(presence.name.clone(), presence.url.as_str()) {
        Ok(activity) => activity,
        Err(e) => {
            tracing::warn!("Invalid presence URL '{}': {}", presence.url, e);
            serenity::ActivityData::playing(presence.name.clone())
        }
    };
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Idle);
}

/// Called once the bot is ready so we can announce a default presence message
/// without repeating the setup code at every call site.
pub fn on_ready(ctx: &serenity::Context, presence: &PresenceConfig) {
    set_watching_status(ctx, presence);
}
