// Speech bubble layout.
//
// The bot talks through embeds: an optional face image as the thumbnail and
// the text either in the description (prefixed by a mood emoji) or in the
// footer (with the mood emoji as the footer icon). This module only decides
// the layout; the Discord layer turns it into a CreateEmbed.

use serde::{Deserialize, Serialize};

/// A custom guild emoji used to set the tone of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mood {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub animated: bool,
}

impl Mood {
    /// Parses emoji markup such as `<:happy:123>` or `<a:wave:456>`.
    pub fn parse(markup: &str) -> Option<Self> {
        let inner = markup.trim().strip_prefix('<')?.strip_suffix('>')?;
        let mut parts = inner.split(':');
        let animated = match parts.next()? {
            "" => false,
            "a" => true,
            _ => return None,
        };
        let name = parts.next()?.to_string();
        let id = parts.next()?.parse().ok()?;
        if name.is_empty() || parts.next().is_some() {
            return None;
        }
        Some(Self { id, name, animated })
    }

    /// Inline markup for message text.
    pub fn mention(&self) -> String {
        let prefix = if self.animated { "a" } else { "" };
        format!("<{}:{}:{}>", prefix, self.name, self.id)
    }

    /// CDN image for embed icons.
    pub fn image_url(&self) -> String {
        let ext = if self.animated { "gif" } else { "png" };
        format!("https://cdn.discordapp.com/emojis/{}.{}", self.id, ext)
    }
}

/// What to say and how.
#[derive(Debug, Clone, Default)]
pub struct Speech {
    pub message: String,
    pub mood: Option<Mood>,
    pub face: Option<String>,
    pub footer: bool,
}

/// Resolved embed fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeechLayout {
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub footer_text: Option<String>,
    pub footer_icon: Option<String>,
}

impl Speech {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn mood(mut self, mood: Option<Mood>) -> Self {
        self.mood = mood;
        self
    }

    pub fn face(mut self, face: Option<String>) -> Self {
        self.face = face;
        self
    }

    pub fn in_footer(mut self, footer: bool) -> Self {
        self.footer = footer;
        self
    }

    pub fn layout(&self) -> SpeechLayout {
        let mut layout = SpeechLayout {
            thumbnail: self.face.clone(),
            ..Default::default()
        };

        if self.footer {
            layout.footer_text = Some(self.message.clone());
            layout.footer_icon = self.mood.as_ref().map(Mood::image_url);
        } else {
            layout.description = Some(match &self.mood {
                Some(mood) => format!("{} {}", mood.mention(), self.message),
                None => self.message.clone(),
            });
        }

        layout
    }
}
