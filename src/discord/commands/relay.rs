// Operator commands for speaking through the bot.
//
// **Notice the pattern:**
// 1. Extract primitive data from Discord types
// 2. Call the core executor
// 3. Answer the operator ephemerally based on the result
//
// Command failures are scoped to the invoking operator and never touch the
// moderation pipeline.

use crate::core::actions::CommandError;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Reply only the invoking operator can see.
async fn reply_ephemeral(ctx: Context<'_>, content: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Whether the bot itself may post in the given channel.
///
/// Reads the cached guild; the cache reference must not live across an await.
fn bot_can_send(ctx: Context<'_>, channel: &serenity::GuildChannel) -> bool {
    let bot_id = ctx.framework().bot_id;
    let Some(guild) = ctx.guild() else {
        tracing::warn!(
            channel_id = channel.id.get(),
            "Guild not cached, cannot resolve bot permissions"
        );
        return false;
    };
    let Some(member) = guild.members.get(&bot_id) else {
        tracing::warn!(
            channel_id = channel.id.get(),
            "Bot member not cached, cannot resolve bot permissions"
        );
        return false;
    };
    guild.user_permissions_in(channel, member).send_messages()
}

/// Send a message using the bot.
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "MANAGE_MESSAGES"
)]
pub async fn send(
    ctx: Context<'_>,
    #[description = "The channel to send the message in"] channel: serenity::GuildChannel,
    #[description = "The message to send"] message: String,
) -> Result<(), Error> {
    let can_send = bot_can_send(ctx, &channel);

    let result = ctx
        .data()
        .pipeline
        .executor()
        .send_to_channel(channel.id.get(), &message, can_send)
        .await;

    match result {
        Ok(()) => reply_ephemeral(ctx, format!("Message sent to <#{}>.", channel.id)).await,
        Err(CommandError::PermissionDenied) => {
            reply_ephemeral(ctx, CommandError::PermissionDenied.to_string()).await
        }
        Err(e) => {
            tracing::warn!("Operator send failed: {}", e);
            reply_ephemeral(ctx, format!("Failed to send the message: {}", e)).await
        }
    }
}

/// Send a DM to a user using the bot. Their replies are forwarded to you.
#[poise::command(slash_command, default_member_permissions = "MANAGE_MESSAGES")]
pub async fn dmsend(
    ctx: Context<'_>,
    #[description = "The user to send the DM to"] user: serenity::User,
    #[description = "The message to send in the DM"] message: String,
) -> Result<(), Error> {
    if user.bot {
        return reply_ephemeral(ctx, "Bots can't receive relayed DMs.").await;
    }

    let result = ctx
        .data()
        .pipeline
        .executor()
        .send_direct(ctx.author().id.get(), user.id.get(), &message)
        .await;

    match result {
        Ok(()) => reply_ephemeral(ctx, format!("DM sent to {}.", user.name)).await,
        Err(CommandError::RecipientUnreachable) => {
            reply_ephemeral(ctx, CommandError::RecipientUnreachable.to_string()).await
        }
        Err(e) => {
            tracing::warn!("Operator DM failed: {}", e);
            reply_ephemeral(ctx, format!("Failed to send the DM: {}", e)).await
        }
    }
}
