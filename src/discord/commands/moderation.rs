// Ban commands.
//
// **Notice the pattern:**
// 1. Extract primitive data from Discord types
// 2. Call the core ban service
// 3. Format the response
//
// The interactive `bans` picker is the only place with real flow: it labels
// the latest records with keycaps and waits for the moderator to react.

use crate::core::bans::{BanError, BanRecord, NewBan};
use crate::core::keycaps;
use crate::core::pronouns::PronounCase;
use crate::core::reactions::ReactionGate;
use crate::discord::speech::{say, speech_embed};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::time::Duration;

const PICKER_TIMEOUT: Duration = Duration::from_secs(60);

/// Ban a member and record the reason in the banlist.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    category = "Moderation",
    required_permissions = "BAN_MEMBERS",
    required_bot_permissions = "BAN_MEMBERS",
    user_cooldown = 5
)]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "Member to ban"] user: serenity::User,
    #[description = "Why they are being banned"]
    #[rest]
    reason: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in servers")?;

    if reason.trim().is_empty() {
        ctx.say("Please give a reason for the ban.").await?;
        return Ok(());
    }

    // Roles are gone once the member is banned, so look them up first.
    let roles: Vec<u64> = match guild_id.member(&ctx, user.id).await {
        Ok(member) => member.roles.iter().map(|role| role.get()).collect(),
        Err(_) => Vec::new(),
    };
    let forms = ctx.data().pronouns.forms_for(&roles);

    let repeat_offender = ctx.data().bans.is_banned(user.id.get()).await?;

    guild_id
        .ban_with_reason(ctx.http(), user.id, 0, &reason)
        .await?;

    let record = ctx
        .data()
        .bans
        .record_ban(NewBan {
            user_id: user.id.get(),
            display_name: Some(user.global_name.clone().unwrap_or_else(|| user.name.clone())),
            banned_by: ctx.author().id.get(),
            reason,
        })
        .await?;

    let mut message = format!(
        "**{}** has been banned. I've written down {} reason: {}",
        user.name,
        forms.get(PronounCase::Possessive),
        record.reason
    );
    if repeat_offender {
        message.push_str(&format!(
            "\nThis isn't {} first time on the banlist.",
            forms.get(PronounCase::Possessive)
        ));
    }
    let speech = say(ctx.data(), message);
    ctx.send(poise::CreateReply::default().embed(speech_embed(&speech)))
        .await?;

    Ok(())
}

/// Unban a user and clear their banlist records.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    category = "Moderation",
    required_permissions = "BAN_MEMBERS",
    required_bot_permissions = "BAN_MEMBERS"
)]
pub async fn unban(
    ctx: Context<'_>,
    #[description = "User to unban"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in servers")?;

    guild_id.unban(ctx.http(), user.id).await?;
    let removed = ctx.data().bans.unban(user.id.get()).await?;

    let message = match removed {
        0 => format!("**{}** has been unbanned.", user.name),
        1 => format!("**{}** has been unbanned and their ban record cleared.", user.name),
        n => format!(
            "**{}** has been unbanned and {} ban records cleared.",
            user.name, n
        ),
    };
    let speech = say(ctx.data(), message);
    ctx.send(poise::CreateReply::default().embed(speech_embed(&speech)))
        .await?;

    Ok(())
}

/// Show the ban history recorded for a user.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    category = "Moderation",
    required_permissions = "BAN_MEMBERS"
)]
pub async fn baninfo(
    ctx: Context<'_>,
    #[description = "User to look up"] user: serenity::User,
) -> Result<(), Error> {
    let history = ctx.data().bans.history_for(user.id.get()).await?;

    if history.is_empty() {
        let speech = say(ctx.data(), format!("I have no bans on record for **{}**.", user.name));
        ctx.send(poise::CreateReply::default().embed(speech_embed(&speech)))
            .await?;
        return Ok(());
    }

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("Ban history for {}", user.name))
        .color(0xED4245)
        .thumbnail(user.face());

    for record in history.iter().take(10) {
        let (name, value) = record_field(record);
        embed = embed.field(name, value, false);
    }

    let mut footer = match history.first().and_then(BanRecord::banned_at) {
        Some(at) => format!("Last banned on {}", at.format("%Y-%m-%d")),
        None => String::new(),
    };
    if history.len() > 10 {
        footer.push_str(&format!(" (and {} older records)", history.len() - 10));
    }
    if !footer.is_empty() {
        embed = embed.footer(serenity::CreateEmbedFooter::new(footer.trim_start()));
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// List recent bans and react with a number to see the details.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    category = "Moderation",
    required_permissions = "BAN_MEMBERS",
    required_bot_permissions = "ADD_REACTIONS"
)]
pub async fn bans(ctx: Context<'_>) -> Result<(), Error> {
    let recent = ctx
        .data()
        .bans
        .recent(keycaps::MAX_KEYCAP as u32)
        .await?;

    if recent.is_empty() {
        let speech = say(ctx.data(), "The banlist is empty. Good dogs all around!");
        ctx.send(poise::CreateReply::default().embed(speech_embed(&speech)))
            .await?;
        return Ok(());
    }

    let labels = keycaps::numbered(recent.len());
    let listing = recent
        .iter()
        .zip(&labels)
        .map(|(record, label)| {
            format!(
                "{} **{}** <t:{}:R>",
                label,
                display_name(record),
                record.banned_on
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let embed = serenity::CreateEmbed::new()
        .title("Recent bans")
        .description(listing)
        .color(0xED4245)
        .footer(serenity::CreateEmbedFooter::new(
            "React with a number to see the full record.",
        ));

    let handle = ctx.send(poise::CreateReply::default().embed(embed)).await?;
    let message = handle.message().await?;

    for label in &labels {
        message
            .react(&ctx, serenity::ReactionType::Unicode(label.clone()))
            .await?;
    }

    let gate = ReactionGate::new(message.id.get(), [ctx.author().id.get()], labels.clone());
    let allows = gate.into_predicate();

    let picked = message
        .await_reaction(ctx.serenity_context().shard.clone())
        .timeout(PICKER_TIMEOUT)
        .filter(move |reaction| {
            let user_id = reaction.user_id.map(|id| id.get()).unwrap_or_default();
            allows(
                reaction.message_id.get(),
                user_id,
                &reaction.emoji.to_string(),
            )
        })
        .await;

    let Some(reaction) = picked else {
        tracing::debug!(message_id = message.id.get(), "Ban picker timed out");
        let speech = say(ctx.data(), "Nobody picked a record, so I stopped listening.")
            .in_footer(true);
        ctx.send(poise::CreateReply::default().embed(speech_embed(&speech)))
            .await?;
        return Ok(());
    };

    let index = keycaps::decode(&reaction.emoji.to_string())? as usize;
    let Some(record) = index.checked_sub(1).and_then(|i| recent.get(i)) else {
        return Ok(());
    };

    let (name, value) = record_field(record);
    let detail = serenity::CreateEmbed::new()
        .title(name)
        .description(value)
        .color(0xED4245);
    ctx.send(poise::CreateReply::default().embed(detail)).await?;

    Ok(())
}

/// Delete a single banlist record by its number.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    category = "Moderation",
    required_permissions = "BAN_MEMBERS"
)]
pub async fn delban(
    ctx: Context<'_>,
    #[description = "Record number, as shown by baninfo"] id: i64,
) -> Result<(), Error> {
    let record = match ctx.data().bans.get(id).await {
        Ok(record) => record,
        Err(BanError::NotFound(_)) => {
            ctx.say(format!("There is no ban record #{}.", id)).await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    ctx.data().bans.remove_record(record.id).await?;
    tracing::info!(
        ban_id = record.id,
        removed_by = ctx.author().id.get(),
        "Ban record deleted"
    );

    let (name, value) = record_field(&record);
    let embed = serenity::CreateEmbed::new()
        .title(format!("Deleted {}", name))
        .description(value)
        .color(0x99AAB5);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

fn display_name(record: &BanRecord) -> String {
    record
        .display_name
        .clone()
        .unwrap_or_else(|| format!("<@{}>", record.user_id))
}

fn record_field(record: &BanRecord) -> (String, String) {
    let name = format!("#{} {}", record.id, display_name(record));
    let value = format!(
        "**User:** <@{user}> (`{user}`)\n**Banned by:** <@{by}>\n**When:** <t:{on}:f>\n**Reason:** {reason}",
        user = record.user_id,
        by = record.banned_by,
        on = record.banned_on,
        reason = record.reason
    );
    (name, value)
}
