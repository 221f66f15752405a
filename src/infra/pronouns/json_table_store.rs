// JSON file store for the pronoun role table.

use crate::core::pronouns::{PronounError, PronounTable, PronounTableStore};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct JsonPronounTableStore {
    path: PathBuf,
}

impl JsonPronounTableStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl PronounTableStore for JsonPronounTableStore {
    /// A missing file means an empty table, so everyone gets neutral forms.
    async fn load(&self) -> Result<PronounTable, PronounError> {
        if !self.path.exists() {
            return Ok(PronounTable::default());
        }

        let text = fs::read_to_string(&self.path)
            .await
            .map_err(|e| PronounError::StorageError(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| PronounError::StorageError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pronouns::PronounCase;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_is_empty_table() {
        let dir = tempdir().unwrap();
        let store = JsonPronounTableStore::new(dir.path().join("nope.json"));
        assert_eq!(store.load().await.unwrap(), PronounTable::default());
    }

    #[tokio::test]
    async fn test_loads_table_in_file_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.json");
        std::fs::write(
            &path,
            r#"{ "roles": [
                { "role_id": 1, "subject": "the boss", "object": "the boss", "possessive": "the boss's" },
                { "role_id": 2, "subject": "she", "object": "her", "possessive": "her" }
            ] }"#,
        )
        .unwrap();

        let table = JsonPronounTableStore::new(&path).load().await.unwrap();
        assert_eq!(table.resolve(&[2, 1], PronounCase::Possessive), "the boss's");
    }

    #[tokio::test]
    async fn test_garbage_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(JsonPronounTableStore::new(&path).load().await.is_err());
    }
}
