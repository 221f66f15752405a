// Environment-backed configuration source.
//
// `Server.DevMode` is read from `SERVER_DEV_MODE`, `Bot.ChannelErrorLog`
// from `BOT_CHANNEL_ERROR_LOG` and so on. A `.env` file is loaded into the
// environment by main before this is used.

use crate::core::config::ConfigSource;

#[derive(Debug, Default, Clone)]
pub struct EnvConfigSource {
    prefix: Option<String>,
}

impl EnvConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `prefix_` to every variable name, e.g. `GUARDDOG_SERVER_DEV_MODE`.
    #[cfg(test)]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    pub fn var_name(&self, section: &str, key: &str) -> String {
        let name = format!("{}_{}", screaming_snake(section), screaming_snake(key));
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix.to_uppercase(), name),
            None => name,
        }
    }
}

impl ConfigSource for EnvConfigSource {
    fn get(&self, section: &str, key: &str) -> Option<String> {
        std::env::var(self.var_name(section, key)).ok()
    }
}

/// `ChannelErrorLog` -> `CHANNEL_ERROR_LOG`.
fn screaming_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for ch in name.chars() {
        if ch.is_uppercase() && previous_lower {
            out.push('_');
        }
        previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
        out.extend(ch.to_uppercase());
    }
    out
}
