use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::collections::HashMap;

// Categories in the order they are shown
const CATEGORY_ORDER: &[&str] = &["Moderation", "Utilities"];

fn get_category_emoji(category: &str) -> &'static str {
    match category {
        "Moderation" => "🔨",
        "Utilities" => "🧰",
        _ => "•",
    }
}

fn get_command_priority(name: &str) -> i32 {
    match name {
        "ban" => 100,
        "unban" => 90,
        "bans" => 80,
        "baninfo" => 70,
        "delban" => 60,
        "checkurl" => 50,
        "pronouns" => 40,
        "ping" => 10,
        _ => 0,
    }
}

/// Show a categorized list of commands.
#[poise::command(slash_command, prefix_command, category = "Utilities")]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let prefix = &ctx.data().config.prefix;
    let mut categories: HashMap<&str, Vec<(i32, String)>> = HashMap::new();

    for command in &ctx.framework().options().commands {
        if command.hide_in_help || command.name == "help" {
            continue;
        }
        if ctx.data().config.is_disabled(&command.name) {
            continue;
        }

        let description = command
            .description
            .as_deref()
            .or(command.help_text.as_deref())
            .unwrap_or("No description provided.");

        categories
            .entry(command.category.as_deref().unwrap_or("Utilities"))
            .or_default()
            .push((
                get_command_priority(&command.name),
                format_entry(prefix, &command.name, description),
            ));
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("Guarddog Command Guide")
        .description(format!(
            "Every command works as a slash command or with the `{}` prefix.",
            prefix
        ))
        .color(serenity::Colour::from_rgb(88, 101, 242))
        .timestamp(serenity::Timestamp::now());

    if let Ok(user) = ctx.framework().bot_id.to_user(&ctx).await {
        embed = embed.thumbnail(user.face());
    }

    for category in sorted_categories(categories.keys().copied().collect()) {
        let Some(entries) = categories.get_mut(category) else {
            continue;
        };
        // Priority descending, then name
        entries.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let title = format!("{} {}", get_category_emoji(category), category);
        let formatted: Vec<String> = entries.iter().map(|(_, s)| s.clone()).collect();

        for (i, chunk) in chunk_entries(&formatted).iter().enumerate() {
            let field_name = if i == 0 {
                title.clone()
            } else {
                format!("{} (cont.)", title)
            };
            embed = embed.field(field_name, chunk.join("\n"), false);
        }
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

fn format_entry(prefix: &str, name: &str, description: &str) -> String {
    format!("• **/{0}** or `{1}{0}`: {2}", name, prefix, description)
}

/// Known categories first, the rest alphabetically.
fn sorted_categories(mut categories: Vec<&str>) -> Vec<&str> {
    categories.sort_by(|a, b| {
        let pos_a = CATEGORY_ORDER.iter().position(|x| x == a).unwrap_or(999);
        let pos_b = CATEGORY_ORDER.iter().position(|x| x == b).unwrap_or(999);
        pos_a.cmp(&pos_b).then(a.cmp(b))
    });
    categories
}

fn chunk_entries(entries: &[String]) -> Vec<Vec<String>> {
    let mut chunks = Vec::new();
    let mut current_chunk = Vec::new();
    let mut current_length = 0;

    for entry in entries {
        let entry_len = entry.len();
        // Discord field value limit is 1024. We leave a bit of buffer.
        if !current_chunk.is_empty() && current_length + entry_len + 1 > 1000 {
            chunks.push(current_chunk);
            current_chunk = Vec::new();
            current_length = 0;
        }

        current_chunk.push(entry.clone());
        current_length += entry_len + 1; // +1 for newline
    }

    if !current_chunk.is_empty() {
        chunks.push(current_chunk);
    }

    chunks
}
