// Discord commands module.
// Each feature gets its own command file.

pub mod help;

pub mod moderation;

pub mod utility;

use crate::discord::{Data, Error};

/// Every command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        moderation::ban(),
        moderation::unban(),
        moderation::baninfo(),
        moderation::bans(),
        moderation::delban(),
        utility::checkurl(),
        utility::pronouns(),
        utility::ping(),
        help::help(),
    ]
}
