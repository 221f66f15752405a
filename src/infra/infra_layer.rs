// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "bans/sqlite_ban_store.rs"]
pub mod bans;

#[path = "config/env_source.rs"]
pub mod config;

#[path = "dns/system_resolver.rs"]
pub mod dns;

#[path = "logging/mod.rs"]
pub mod logging;

#[path = "pronouns/json_table_store.rs"]
pub mod pronouns;
