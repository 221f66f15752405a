// Ban record domain models.
//
// Pure data, no Discord or SQL types. Identifiers are Discord snowflakes.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A moderation ban as stored in the banlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanRecord {
    pub id: i64,
    pub user_id: u64,
    /// Name the user had when banned, so lookups work after they leave.
    pub display_name: Option<String>,
    pub banned_by: u64,
    pub reason: String,
    /// Seconds since the Unix epoch.
    pub banned_on: u64,
}

impl BanRecord {
    pub fn banned_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.banned_on as i64, 0).single()
    }
}

/// Payload for recording a new ban. The timestamp is stamped on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBan {
    pub user_id: u64,
    pub display_name: Option<String>,
    pub banned_by: u64,
    pub reason: String,
}
