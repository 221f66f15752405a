// Main entry point for the bot.
// This file wires together all the layers:
// - Config and logging come up first
// - Infra stores are created and handed to core services
// - Discord commands and the error hook get the services through `Data`

#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::bans::BanService;
use crate::core::config::BotConfig;
use crate::core::pronouns::PronounTableStore;
use crate::core::urls::UrlValidator;
use crate::discord::errors::{command_enabled, on_error};
use crate::discord::{Data, Error};
use crate::infra::bans::SqliteBanStore;
use crate::infra::config::EnvConfigSource;
use crate::infra::dns::SystemResolver;
use crate::infra::pronouns::JsonPronounTableStore;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    _data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Ready { data_about_bot } = event {
        tracing::debug!(
            "Logged in as {} ({})",
            data_about_bot.user.name,
            data_about_bot.user.id
        );
        tracing::info!(
            guilds = data_about_bot.guilds.len(),
            "Guarddog is on the prowl"
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = BotConfig::load(&EnvConfigSource::new()).context("Invalid configuration")?;

    // Keep the guard alive, dropping it stops the file log writer.
    let _log_guard = infra::logging::init(&config.log_directory, config.dev_mode)?;

    if config.dev_mode {
        tracing::info!(prefix = %config.prefix, "Running in dev mode");
    }

    let ban_store = SqliteBanStore::connect(&config.database_path)
        .await
        .with_context(|| format!("Failed to open banlist database {}", config.database_path))?;
    let ban_service = Arc::new(BanService::new(ban_store));

    let pronoun_table = JsonPronounTableStore::new(&config.pronoun_roles_path)
        .load()
        .await
        .context("Failed to load pronoun roles")?;
    tracing::debug!(roles = pronoun_table.roles.len(), "Pronoun roles loaded");

    let url_validator = Arc::new(UrlValidator::new(SystemResolver));

    let config = Arc::new(config);
    let data = Data {
        config: Arc::clone(&config),
        bans: ban_service,
        urls: url_validator,
        pronouns: Arc::new(pronoun_table),
    };

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required for prefix commands
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS
        | serenity::GatewayIntents::DIRECT_MESSAGES;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: discord::commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            command_check: Some(|ctx| Box::pin(command_enabled(ctx))),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.prefix.clone()),
                // Two bots answering the same mention is confusing in dev.
                mention_as_prefix: !config.dev_mode,
                case_insensitive_commands: true,
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!(
                    commands = framework.options().commands.len(),
                    "Commands registered"
                );
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}
