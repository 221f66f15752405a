// Ban record service - core business logic for the banlist.
//
// This service handles:
// - Validating new bans (real snowflakes, a non-empty reason)
// - Stamping the ban time
// - Lookups by user and recent history
// - Removing records when someone is unbanned
//
// NO Discord dependencies here - just pure domain logic.

use super::ban_models::{BanRecord, NewBan};
use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum BanError {
    #[error("A ban reason is required")]
    EmptyReason,

    #[error("Invalid {field} snowflake: {value}")]
    InvalidSnowflake { field: &'static str, value: u64 },

    #[error("No ban record with id {0}")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for persisting ban records.
#[async_trait]
pub trait BanStore: Send + Sync {
    /// Insert a record and return it with its assigned id.
    async fn insert(&self, ban: NewBan, banned_on: u64) -> Result<BanRecord, BanError>;

    async fn get(&self, id: i64) -> Result<Option<BanRecord>, BanError>;

    /// All records for a user, newest first.
    async fn find_by_user(&self, user_id: u64) -> Result<Vec<BanRecord>, BanError>;

    /// Most recent records across all users, newest first.
    async fn recent(&self, limit: u32) -> Result<Vec<BanRecord>, BanError>;

    /// Delete one record. Returns whether it existed.
    async fn delete(&self, id: i64) -> Result<bool, BanError>;

    /// Delete every record for a user. Returns how many were removed.
    async fn delete_for_user(&self, user_id: u64) -> Result<u64, BanError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct BanService<S: BanStore> {
    store: S,
}

impl<S: BanStore> BanService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record a ban issued now.
    pub async fn record_ban(&self, ban: NewBan) -> Result<BanRecord, BanError> {
        let banned_on = Utc::now().timestamp().max(0) as u64;
        self.record_ban_at(ban, banned_on).await
    }

    /// Record a ban with an explicit timestamp (imports, tests).
    pub async fn record_ban_at(&self, mut ban: NewBan, banned_on: u64) -> Result<BanRecord, BanError> {
        validate_snowflake("user_id", ban.user_id)?;
        validate_snowflake("banned_by", ban.banned_by)?;

        let reason = ban.reason.trim();
        if reason.is_empty() {
            return Err(BanError::EmptyReason);
        }
        ban.reason = reason.to_string();
        ban.display_name = ban
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let record = self.store.insert(ban, banned_on).await?;
        tracing::info!(
            ban_id = record.id,
            user_id = record.user_id,
            banned_by = record.banned_by,
            "Recorded ban"
        );
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> Result<BanRecord, BanError> {
        self.store.get(id).await?.ok_or(BanError::NotFound(id))
    }

    /// Ban history for a user, newest first.
    pub async fn history_for(&self, user_id: u64) -> Result<Vec<BanRecord>, BanError> {
        self.store.find_by_user(user_id).await
    }

    pub async fn is_banned(&self, user_id: u64) -> Result<bool, BanError> {
        Ok(!self.store.find_by_user(user_id).await?.is_empty())
    }

    pub async fn recent(&self, limit: u32) -> Result<Vec<BanRecord>, BanError> {
        self.store.recent(limit).await
    }

    /// Unban flow: drop every record for the user.
    pub async fn unban(&self, user_id: u64) -> Result<u64, BanError> {
        let removed = self.store.delete_for_user(user_id).await?;
        tracing::info!(user_id, removed, "Removed ban records");
        Ok(removed)
    }

    /// Drop a single record by id.
    pub async fn remove_record(&self, id: i64) -> Result<(), BanError> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(BanError::NotFound(id))
        }
    }
}

/// Discord snowflakes are never zero; anything else fits in a u64.
fn validate_snowflake(field: &'static str, value: u64) -> Result<(), BanError> {
    if value == 0 {
        return Err(BanError::InvalidSnowflake { field, value });
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// In-memory store for testing
    struct MockBanStore {
        records: DashMap<i64, BanRecord>,
        next_id: AtomicI64,
    }

    impl MockBanStore {
        fn new() -> Self {
            Self {
                records: DashMap::new(),
                next_id: AtomicI64::new(1),
            }
        }

        fn sorted(mut records: Vec<BanRecord>) -> Vec<BanRecord> {
            records.sort_by(|a, b| b.banned_on.cmp(&a.banned_on).then(b.id.cmp(&a.id)));
            records
        }
    }

    #[async_trait]
    impl BanStore for MockBanStore {
        async fn insert(&self, ban: NewBan, banned_on: u64) -> Result<BanRecord, BanError> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let record = BanRecord {
                id,
                user_id: ban.user_id,
                display_name: ban.display_name,
                banned_by: ban.banned_by,
                reason: ban.reason,
                banned_on,
            };
            self.records.insert(id, record.clone());
            Ok(record)
        }

        async fn get(&self, id: i64) -> Result<Option<BanRecord>, BanError> {
            Ok(self.records.get(&id).map(|r| r.clone()))
        }

        async fn find_by_user(&self, user_id: u64) -> Result<Vec<BanRecord>, BanError> {
            Ok(Self::sorted(
                self.records
                    .iter()
                    .filter(|r| r.user_id == user_id)
                    .map(|r| r.clone())
                    .collect(),
            ))
        }

        async fn recent(&self, limit: u32) -> Result<Vec<BanRecord>, BanError> {
            let mut all = Self::sorted(self.records.iter().map(|r| r.clone()).collect());
            all.truncate(limit as usize);
            Ok(all)
        }

        async fn delete(&self, id: i64) -> Result<bool, BanError> {
            Ok(self.records.remove(&id).is_some())
        }

        async fn delete_for_user(&self, user_id: u64) -> Result<u64, BanError> {
            let before = self.records.len();
            self.records.retain(|_, r| r.user_id != user_id);
            Ok((before - self.records.len()) as u64)
        }
    }

    fn ban(user_id: u64, reason: &str) -> NewBan {
        NewBan {
            user_id,
            display_name: Some("Rex".to_string()),
            banned_by: 222,
            reason: reason.to_string(),
        }
    }

    #[tokio::test]
    async fn test_record_ban_stamps_time_and_trims_reason() {
        let service = BanService::new(MockBanStore::new());

        let record = service.record_ban(ban(111, "  spamming invites  ")).await.unwrap();

        assert_eq!(record.reason, "spamming invites");
        assert!(record.banned_on > 0);
        assert_eq!(service.get(record.id).await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_empty_reason_rejected() {
        let service = BanService::new(MockBanStore::new());
        let result = service.record_ban(ban(111, "   ")).await;
        assert!(matches!(result, Err(BanError::EmptyReason)));
    }

    #[tokio::test]
    async fn test_zero_snowflake_rejected() {
        let service = BanService::new(MockBanStore::new());

        let result = service.record_ban(ban(0, "raid")).await;
        assert!(matches!(
            result,
            Err(BanError::InvalidSnowflake { field: "user_id", .. })
        ));

        let mut by_nobody = ban(111, "raid");
        by_nobody.banned_by = 0;
        let result = service.record_ban(by_nobody).await;
        assert!(matches!(
            result,
            Err(BanError::InvalidSnowflake { field: "banned_by", .. })
        ));
    }

    #[tokio::test]
    async fn test_blank_display_name_dropped() {
        let service = BanService::new(MockBanStore::new());
        let mut new_ban = ban(111, "raid");
        new_ban.display_name = Some("  ".to_string());

        let record = service.record_ban(new_ban).await.unwrap();
        assert_eq!(record.display_name, None);
    }

    #[tokio::test]
    async fn test_history_newest_first_and_unban() {
        let service = BanService::new(MockBanStore::new());
        service.record_ban_at(ban(111, "first"), 100).await.unwrap();
        service.record_ban_at(ban(111, "second"), 200).await.unwrap();
        service.record_ban_at(ban(333, "other"), 150).await.unwrap();

        let history = service.history_for(111).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].reason, "second");
        assert!(service.is_banned(111).await.unwrap());

        let recent = service.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].reason, "other");

        assert_eq!(service.unban(111).await.unwrap(), 2);
        assert!(!service.is_banned(111).await.unwrap());
        assert!(service.is_banned(333).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_missing_record() {
        let service = BanService::new(MockBanStore::new());
        assert!(matches!(
            service.remove_record(99).await,
            Err(BanError::NotFound(99))
        ));
    }
}
