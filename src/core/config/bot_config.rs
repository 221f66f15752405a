// Bot configuration.
//
// Settings are addressed as `Section.Key` (e.g. `Server.DevMode`) through a
// `ConfigSource`, which gives typed getters with fallbacks on top of plain
// string lookups. `BotConfig::load` reads everything the bot needs once at
// startup.

use crate::core::speech::Mood;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting {section}.{key}")]
    Missing { section: String, key: String },

    #[error("Invalid value for {section}.{key}: {value:?} ({reason})")]
    Invalid {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Section/key lookups with typed getters.
///
/// Implementors only provide `get`; blank values count as unset.
pub trait ConfigSource: Send + Sync {
    fn get(&self, section: &str, key: &str) -> Option<String>;

    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_or(&self, section: &str, key: &str, fallback: &str) -> String {
        self.get_string(section, key)
            .unwrap_or_else(|| fallback.to_string())
    }

    fn require(&self, section: &str, key: &str) -> Result<String, ConfigError> {
        self.get_string(section, key).ok_or_else(|| ConfigError::Missing {
            section: section.to_string(),
            key: key.to_string(),
        })
    }

    /// Accepts 1/yes/true/on and 0/no/false/off, case-insensitively.
    fn get_bool(&self, section: &str, key: &str, fallback: bool) -> Result<bool, ConfigError> {
        let Some(raw) = self.get_string(section, key) else {
            return Ok(fallback);
        };
        match raw.to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" | "on" => Ok(true),
            "0" | "no" | "false" | "off" => Ok(false),
            _ => Err(invalid(section, key, &raw, "expected a boolean")),
        }
    }

    fn get_u64(&self, section: &str, key: &str) -> Result<Option<u64>, ConfigError> {
        match self.get_string(section, key) {
            Some(raw) => raw
                .parse::<u64>()
                .map(Some)
                .map_err(|e| invalid(section, key, &raw, &e.to_string())),
            None => Ok(None),
        }
    }

    /// Comma separated list, entries trimmed, blanks dropped.
    fn get_list(&self, section: &str, key: &str) -> Vec<String> {
        self.get_string(section, key)
            .map(|raw| {
                raw.split(',')
                    .map(|item| item.trim().to_string())
                    .filter(|item| !item.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    /// `Server.DevMode`: dev prefix and verbose debug logging.
    pub dev_mode: bool,
    /// `Bot.ChannelErrorLog`: where unexpected command errors get reported.
    pub error_log_channel: Option<u64>,
    pub prefix: String,
    /// Lowercased command names refused by the global command check.
    pub disabled_commands: Vec<String>,
    pub mood: Option<Mood>,
    pub face_url: Option<String>,
    pub pronoun_roles_path: PathBuf,
    pub database_path: String,
    pub log_directory: PathBuf,
}

impl BotConfig {
    pub const DEFAULT_PREFIX: &'static str = "d!";
    pub const DEV_PREFIX: &'static str = "dd!";

    pub fn load(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let dev_mode = source.get_bool("Server", "DevMode", false)?;

        let default_prefix = if dev_mode {
            Self::DEV_PREFIX
        } else {
            Self::DEFAULT_PREFIX
        };

        let mood = match source.get_string("Bot", "MoodEmoji") {
            Some(raw) => Some(
                Mood::parse(&raw)
                    .ok_or_else(|| invalid("Bot", "MoodEmoji", &raw, "expected <:name:id>"))?,
            ),
            None => None,
        };

        Ok(Self {
            token: source.require("Bot", "Token")?,
            dev_mode,
            error_log_channel: source.get_u64("Bot", "ChannelErrorLog")?,
            prefix: source.get_or("Bot", "Prefix", default_prefix),
            disabled_commands: source
                .get_list("Bot", "DisabledCommands")
                .into_iter()
                .map(|name| name.to_lowercase())
                .collect(),
            mood,
            face_url: source.get_string("Bot", "FaceUrl"),
            pronoun_roles_path: PathBuf::from(source.get_or(
                "Bot",
                "PronounRoles",
                "data/pronoun_roles.json",
            )),
            database_path: source.get_or("Database", "Path", "data/guarddog.db"),
            log_directory: PathBuf::from(source.get_or("Logging", "Directory", "logs")),
        })
    }

    pub fn is_disabled(&self, command_name: &str) -> bool {
        let name = command_name.to_lowercase();
        self.disabled_commands.iter().any(|disabled| *disabled == name)
    }
}
