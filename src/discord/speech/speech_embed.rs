// Turns a speech bubble layout into a Discord embed.

use crate::core::speech::Speech;
use crate::discord::Data;
use poise::serenity_prelude as serenity;

/// A speech bubble in the bot's configured mood and face.
pub fn say(data: &Data, message: impl Into<String>) -> Speech {
    Speech::new(message)
        .mood(data.config.mood.clone())
        .face(data.config.face_url.clone())
}

pub fn speech_embed(speech: &Speech) -> serenity::CreateEmbed {
    let layout = speech.layout();
    let mut embed = serenity::CreateEmbed::new();

    if let Some(face) = layout.thumbnail {
        embed = embed.thumbnail(face);
    }

    if let Some(description) = layout.description {
        embed = embed.description(description);
    }

    if let Some(text) = layout.footer_text {
        let mut footer = serenity::CreateEmbedFooter::new(text);
        if let Some(icon) = layout.footer_icon {
            footer = footer.icon_url(icon);
        }
        embed = embed.footer(footer);
    }

    embed
}
