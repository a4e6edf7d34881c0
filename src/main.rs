// This is the entry point of the AI-silencing Discord bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (classifier API)
// - `discord/` = Discord-specific adapters (commands, events, platform)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::actions::{ActionExecutor, DEFAULT_NOTICE_TEMPLATE};
use crate::core::moderation::{ModerationConfig, ModerationService};
use crate::core::pipeline::MessagePipeline;
use crate::core::relay::{ConversationRouter, RelayConfig};
use crate::discord::commands::presence;
use crate::discord::message_events;
use crate::discord::platform::SerenityPlatform;
use crate::discord::{Data, Error, PresenceConfig};
use crate::infra::classifier::huggingface_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::infra::classifier::HuggingFaceClassifier;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_PRESENCE_NAME: &str = "I Silence AI";
const DEFAULT_PRESENCE_URL: &str = "https://stellarium-web.org";
// How often expired relay entries are swept
const RELAY_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Event handler for non-command Discord events.
/// Every new message goes through the detection/relay pipeline.
async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Message { new_message } = event {
        message_events::handle_new_message(new_message, data).await;
    }

    Ok(())
}

/// Read an optional env var, falling back to `default` when it is missing or
/// does not parse.
fn env_or<T: FromStr>(key: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring invalid {}='{}': {}", key, raw, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Parse a comma-separated list of channel IDs, skipping junk entries.
fn parse_channel_ids(raw: &str) -> HashSet<u64> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| match part.parse::<u64>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!("Ignoring invalid channel id in WATCHED_CHANNEL_IDS: '{}'", part);
                None
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Get Discord bot token from environment
    let token = std::env::var("DISCORD_TOKEN").context(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    )?;

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    let defaults = ModerationConfig::default();
    let moderation_config = ModerationConfig {
        enabled: env_or("AI_DETECTION_ENABLED", defaults.enabled),
        confidence_threshold: env_or("AI_CONFIDENCE_THRESHOLD", defaults.confidence_threshold),
        min_length: env_or("AI_MIN_MESSAGE_LENGTH", defaults.min_length),
    };

    let relay_defaults = RelayConfig::default();
    let relay_config = RelayConfig {
        entry_ttl: chrono::Duration::hours(env_or(
            "RELAY_TTL_HOURS",
            relay_defaults.entry_ttl.num_hours(),
        )),
        max_entries: env_or("RELAY_MAX_ENTRIES", relay_defaults.max_entries),
    };

    let watched_channels = std::env::var("WATCHED_CHANNEL_IDS")
        .map(|raw| parse_channel_ids(&raw))
        .unwrap_or_default();

    let notice_template =
        std::env::var("TERMINATION_NOTICE").unwrap_or_else(|_| DEFAULT_NOTICE_TEMPLATE.to_string());

    let presence_config = PresenceConfig {
        name: std::env::var("PRESENCE_NAME").unwrap_or_else(|_| DEFAULT_PRESENCE_NAME.to_string()),
        url: std::env::var("PRESENCE_URL").unwrap_or_else(|_| DEFAULT_PRESENCE_URL.to_string()),
    };

    tracing::info!(
        enabled = moderation_config.enabled,
        threshold = moderation_config.confidence_threshold,
        min_length = moderation_config.min_length,
        watched_channels = watched_channels.len(),
        "AI detection configured"
    );

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let hf_base_url =
        std::env::var("HF_INFERENCE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let hf_model = std::env::var("HF_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    let hf_token = std::env::var("HF_API_TOKEN").ok();
    let classifier_timeout = Duration::from_secs(env_or("CLASSIFIER_TIMEOUT_SECS", 30u64));

    let classifier =
        HuggingFaceClassifier::new(&hf_base_url, &hf_model, hf_token, classifier_timeout)
            .context("Failed to create classifier client")?;
    let moderation_service = ModerationService::new(classifier, moderation_config);

    let relay = Arc::new(ConversationRouter::new(relay_config));

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================
    // Configure the poise framework with our commands and settings.

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::DIRECT_MESSAGES; // Required for relayed replies

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            // Register all our commands here
            commands: vec![
                discord::commands::relay::send(),
                discord::commands::relay::dmsend(),
            ],
            // Event handler for messages and other events
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!("Logged in as {}", ready.user.name);

                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Slash commands registered");

                // The executor needs the HTTP client, which only exists once connected
                let platform = SerenityPlatform::new(ctx.http.clone());
                let executor =
                    ActionExecutor::new(platform, Arc::clone(&relay), notice_template);
                let pipeline = MessagePipeline::new(
                    moderation_service,
                    executor,
                    Arc::clone(&relay),
                    watched_channels,
                );

                let data = Data {
                    pipeline: Arc::new(pipeline),
                    relay,
                    presence: presence_config,
                };

                presence::on_ready(ctx, &data.presence);

                // Background sweep so relay entries for silent targets don't pile up
                let relay_clone = Arc::clone(&data.relay);
                tokio::spawn(async move {
                    loop {
                        tokio::time::sleep(RELAY_SWEEP_INTERVAL).await;
                        let removed = relay_clone.prune_expired();
                        if removed > 0 {
                            tracing::info!(
                                removed,
                                remaining = relay_clone.len(),
                                "Pruned expired relay entries"
                            );
                        }
                    }
                });

                Ok(data)
            })
        })
        .build();

    // Create the client and start the bot
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}
