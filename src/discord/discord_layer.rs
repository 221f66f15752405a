// Discord layer - commands, event handlers and error reporting.
//
// Everything here translates between Discord types and the core. Shared
// state for commands lives in `Data`.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "errors/error_handler.rs"]
pub mod errors;

#[path = "speech/speech_embed.rs"]
pub mod speech;

use crate::core::bans::BanService;
use crate::core::config::BotConfig;
use crate::core::pronouns::PronounTable;
use crate::core::urls::UrlValidator;
use crate::infra::bans::SqliteBanStore;
use crate::infra::dns::SystemResolver;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared across every command invocation.
pub struct Data {
    pub config: Arc<BotConfig>,
    pub bans: Arc<BanService<SqliteBanStore>>,
    pub urls: Arc<UrlValidator<SystemResolver>>,
    pub pronouns: Arc<PronounTable>,
}
