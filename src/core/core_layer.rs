// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "bans/mod.rs"]
pub mod bans;

#[path = "config/bot_config.rs"]
pub mod config;

#[path = "errors/error_classifier.rs"]
pub mod errors;

#[path = "emoji/keycaps.rs"]
pub mod keycaps;

#[path = "pronouns/pronoun_service.rs"]
pub mod pronouns;

#[path = "reactions/reaction_gate.rs"]
pub mod reactions;

#[path = "speech/speech_bubble.rs"]
pub mod speech;

#[path = "urls/url_validator.rs"]
pub mod urls;
