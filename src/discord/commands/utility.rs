// Small utility commands: latency, URL checks and pronoun lookups.

use crate::core::pronouns::PronounCase;
use crate::core::urls::ValidationOptions;
use crate::discord::speech::{say, speech_embed};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::time::Instant;

/// Check that the bot is awake.
#[poise::command(prefix_command, slash_command, category = "Utilities")]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let started = Instant::now();
    let handle = ctx.say("Woof!").await?;
    let elapsed = started.elapsed().as_millis();

    handle
        .edit(
            ctx,
            poise::CreateReply::default().content(format!("Woof! ({} ms)", elapsed)),
        )
        .await?;
    Ok(())
}

/// Check whether a link points at a public web address.
#[poise::command(prefix_command, slash_command, category = "Utilities")]
pub async fn checkurl(
    ctx: Context<'_>,
    #[description = "The link to check"] url: String,
    #[description = "Accept local and private addresses too"] allow_local: Option<bool>,
) -> Result<(), Error> {
    ctx.defer().await?;

    let valid = if allow_local.unwrap_or(false) {
        let options = ValidationOptions {
            deny_localhost: false,
            ..ValidationOptions::default()
        };
        ctx.data().urls.validate(&url, options).await
    } else {
        ctx.data().urls.is_valid(&url).await
    };
    tracing::debug!(%url, valid, "URL check");

    let message = if valid {
        format!("`{}` looks like a valid link.", url)
    } else {
        format!("`{}` doesn't look like a link I can reach.", url)
    };
    let speech = say(ctx.data(), message);
    ctx.send(poise::CreateReply::default().embed(speech_embed(&speech)))
        .await?;
    Ok(())
}

/// Show which pronouns I use for a member.
#[poise::command(prefix_command, slash_command, guild_only, category = "Utilities")]
pub async fn pronouns(
    ctx: Context<'_>,
    #[description = "Member to look up (defaults to you)"] member: Option<serenity::Member>,
) -> Result<(), Error> {
    let member = match member {
        Some(member) => member,
        None => {
            let guild_id = ctx.guild_id().ok_or("This command only works in servers")?;
            guild_id.member(&ctx, ctx.author().id).await?
        }
    };

    let roles: Vec<u64> = member.roles.iter().map(|role| role.get()).collect();
    let table = &ctx.data().pronouns;

    let mut message = format!(
        "I refer to **{}** as {}/{}/{}.",
        member.display_name(),
        table.resolve(&roles, PronounCase::Subject),
        table.resolve(&roles, PronounCase::Object),
        table.resolve(&roles, PronounCase::Possessive),
    );
    match table.matching_role(&roles) {
        Some(role) if !role.label.is_empty() => {
            message.push_str(&format!(" (from the **{}** role)", role.label));
        }
        Some(_) => {}
        None => message.push_str(" (no pronoun role set)"),
    }
    let speech = say(ctx.data(), message);
    ctx.send(poise::CreateReply::default().embed(speech_embed(&speech)))
        .await?;
    Ok(())
}
