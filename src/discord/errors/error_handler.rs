// Framework error hook.
//
// poise hands every failed invocation to `on_error`. We turn it into a
// `CommandFailure`, let the core classifier decide the response, then carry
// that out. Nothing here returns an error: send failures are logged at TRACE
// and dropped.

use crate::core::errors::{classify, format_report, render_trace, CommandFailure, FailureResponse};
use crate::discord::{Context, Data, Error};
use poise::serenity_prelude as serenity;
use std::error::Error as StdError;

/// Raised by the global command check for commands switched off in config.
#[derive(Debug, thiserror::Error)]
#[error("The {0} command has been disabled")]
pub struct CommandDisabled(pub String);

/// Global command check: refuses commands listed in `Bot.DisabledCommands`.
pub async fn command_enabled(ctx: Context<'_>) -> Result<bool, Error> {
    let name = &ctx.command().qualified_name;
    if ctx.data().config.is_disabled(name) {
        return Err(Box::new(CommandDisabled(name.clone())));
    }
    Ok(true)
}

pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    // Commands with their own handler deal with their errors themselves.
    if let Some(ctx) = error.ctx() {
        if ctx.command().on_error.is_some() {
            return;
        }
    }

    let failure = match &error {
        poise::FrameworkError::Setup { error, .. } => {
            tracing::error!("Error during setup: {}", render_trace(error.as_ref()));
            return;
        }
        poise::FrameworkError::EventHandler { error, .. } => {
            tracing::error!("Error in event handler: {}", render_trace(error.as_ref()));
            return;
        }
        poise::FrameworkError::UnknownCommand { .. } => CommandFailure::UnknownCommand,
        poise::FrameworkError::Command { error, .. } => failure_from_error(error.as_ref()),
        poise::FrameworkError::CommandPanic { payload, .. } => CommandFailure::Unclassified {
            summary: "Command panicked".to_string(),
            trace: payload
                .clone()
                .unwrap_or_else(|| "<panic without message>".to_string()),
        },
        poise::FrameworkError::ArgumentParse { .. }
        | poise::FrameworkError::SubcommandRequired { .. } => CommandFailure::InvalidInput,
        poise::FrameworkError::CooldownHit {
            remaining_cooldown, ..
        } => CommandFailure::Cooldown {
            retry_after: *remaining_cooldown,
        },
        poise::FrameworkError::MissingBotPermissions {
            missing_permissions,
            ..
        } => CommandFailure::BotMissingPermissions(permission_slugs(*missing_permissions)),
        poise::FrameworkError::MissingUserPermissions {
            missing_permissions: Some(missing),
            ..
        } => CommandFailure::UserMissingPermissions(permission_slugs(*missing)),
        poise::FrameworkError::MissingUserPermissions {
            missing_permissions: None,
            ..
        } => CommandFailure::CheckFailed(
            "I couldn't check your permissions for this command, please try again.".to_string(),
        ),
        poise::FrameworkError::NotAnOwner { .. } => {
            CommandFailure::CheckFailed("Only the bot owner can use this command.".to_string())
        }
        poise::FrameworkError::GuildOnly { .. } => CommandFailure::GuildOnlyInDirectMessage,
        poise::FrameworkError::DmOnly { .. } => CommandFailure::CheckFailed(
            "This command can only be used in direct messages.".to_string(),
        ),
        poise::FrameworkError::NsfwOnly { .. } => CommandFailure::CheckFailed(
            "This command can only be used in NSFW channels.".to_string(),
        ),
        poise::FrameworkError::CommandCheckFailed { error, .. } => match error {
            Some(error) => check_failure_from_error(error.as_ref()),
            None => CommandFailure::CheckFailed("You cannot use this command here.".to_string()),
        },
        poise::FrameworkError::PermissionFetchFailed { .. } => permission_fetch_failure(),
        _ => {
            tracing::error!("Unhandled framework error");
            return;
        }
    };

    // Everything left came from a command invocation.
    let Some(ctx) = error.ctx() else {
        tracing::warn!("Command failure without a context: {:?}", failure);
        return;
    };

    respond(ctx, failure).await;
}

async fn respond(ctx: Context<'_>, failure: CommandFailure) {
    let prefix = ctx.data().config.prefix.clone();

    match classify(failure, &prefix) {
        FailureResponse::Ignore => {}
        FailureResponse::Reply(message) => {
            if let Err(e) = ctx.say(message).await {
                tracing::trace!("Failed to send error notice: {}", e);
            }
        }
        FailureResponse::DirectMessage(message) => {
            let dm = serenity::CreateMessage::new().content(message);
            // Users who block DMs just don't get told.
            if let Err(e) = ctx.author().direct_message(&ctx, dm).await {
                tracing::trace!("Could not DM {}: {}", ctx.author().id, e);
            }
        }
        FailureResponse::LogWarning(message) => {
            tracing::warn!(command = %ctx.command().qualified_name, "{}", message);
        }
        FailureResponse::Report { summary, trace } => {
            if let Some(channel_id) = ctx.data().config.error_log_channel {
                if let Err(e) = report_to_channel(ctx, channel_id, &trace).await {
                    tracing::trace!("Failed to log exception to the error logging channel: {}", e);
                }
            }
            tracing::error!(
                command = %ctx.command().qualified_name,
                "An unknown exception occurred while executing a command: {}\n{}",
                summary,
                trace
            );
        }
    }
}

async fn report_to_channel(
    ctx: Context<'_>,
    channel_id: u64,
    trace: &str,
) -> Result<(), ::serenity::Error> {
    let app_info = ctx.http().get_current_application_info().await?;
    let mention = app_info.owner.map(|owner| format!("<@{}>", owner.id));
    let content = format_report(mention.as_deref(), trace);

    serenity::ChannelId::new(channel_id)
        .say(ctx.http(), content)
        .await?;
    Ok(())
}

/// Permissions could not be looked up before running a command.
fn permission_fetch_failure() -> CommandFailure {
    CommandFailure::Unclassified {
        summary: "Failed to fetch permissions".to_string(),
        trace: "poise could not fetch the author's or the bot's permissions \
                for this channel"
            .to_string(),
    }
}

/// Walks the source chain of a command error looking for something we know.
pub fn failure_from_error(error: &(dyn StdError + 'static)) -> CommandFailure {
    for cause in std::iter::successors(Some(error), |&e| e.source()) {
        if let Some(disabled) = cause.downcast_ref::<CommandDisabled>() {
            tracing::debug!("{}", disabled);
            return CommandFailure::Disabled;
        }
        if let Some(message) = forbidden_message(cause) {
            return CommandFailure::Forbidden(message);
        }
    }

    CommandFailure::Unclassified {
        summary: error.to_string(),
        trace: render_trace(error),
    }
}

/// Check errors echo their message, except the ones we have a kind for.
pub fn check_failure_from_error(error: &(dyn StdError + 'static)) -> CommandFailure {
    match failure_from_error(error) {
        CommandFailure::Unclassified { summary, .. } => CommandFailure::CheckFailed(summary),
        known => known,
    }
}

fn forbidden_message(error: &(dyn StdError + 'static)) -> Option<String> {
    match error.downcast_ref::<::serenity::Error>()? {
        ::serenity::Error::Http(::serenity::http::HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 403 =>
        {
            Some(format!(
                "Forbidden ({}): {}",
                response.error.code, response.error.message
            ))
        }
        _ => None,
    }
}

/// `MANAGE_GUILD | BAN_MEMBERS` -> `["manage_guild", "ban_members"]`.
pub fn permission_slugs(permissions: serenity::Permissions) -> Vec<String> {
    permissions
        .iter_names()
        .map(|(name, _)| name.to_lowercase())
        .collect()
}
