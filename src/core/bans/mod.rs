// Core bans module - ban records and the rules around them.

pub mod ban_models;
pub mod ban_service;

pub use ban_models::*;
pub use ban_service::*;
