//! Glossary persistence over a key-value store

use serde_json::Value;
use thiserror::Error;

use super::Glossary;
use super::key::{KEY_PREFIX, ParsedKey, parse_key};
use crate::storage::{KeyValueStore, StorageError};

#[derive(Debug, Error)]
pub enum GlossaryError {
    #[error("invalid glossary: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("stored glossary is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type GlossaryResult<T> = std::result::Result<T, GlossaryError>;

pub struct Repository<S> {
    store: S,
}

impl<S: KeyValueStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load a glossary. A missing key yields an empty glossary.
    pub async fn load(&self, key: &str) -> GlossaryResult<Glossary> {
        match self.store.get(key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Glossary::default()),
        }
    }

    /// Load a series glossary layered over the global glossary of the same
    /// language pair. Global keys load as-is.
    pub async fn load_effective(&self, key: &ParsedKey) -> GlossaryResult<Glossary> {
        let own = self.load(&key.original_key).await?;
        if key.is_global() {
            return Ok(own);
        }
        let global = self.load(&key.global_counterpart()).await?;
        Ok(own.with_fallback(&global))
    }

    pub async fn save(&self, key: &str, glossary: &Glossary) -> GlossaryResult<()> {
        glossary.validate().map_err(GlossaryError::Validation)?;
        let raw = serde_json::to_string(glossary)?;
        self.store.put(key, raw).await?;
        tracing::debug!("Saved {} glossary entries under {}", glossary.len(), key);
        Ok(())
    }

    /// Save an untyped payload, as received from an import file. The payload
    /// is checked before anything is written.
    pub async fn save_raw(&self, key: &str, payload: Value) -> GlossaryResult<Glossary> {
        match payload.get("entries") {
            Some(Value::Array(_)) => {}
            _ => {
                return Err(GlossaryError::Validation(
                    "`entries` must be an array".to_string(),
                ));
            }
        }
        let glossary: Glossary = serde_json::from_value(payload)
            .map_err(|e| GlossaryError::Validation(e.to_string()))?;
        self.save(key, &glossary).await?;
        Ok(glossary)
    }

    pub async fn delete(&self, key: &str) -> GlossaryResult<()> {
        self.store.delete(key).await?;
        Ok(())
    }

    /// All stored glossary keys. Keys that do not parse are skipped.
    pub async fn scan_all(&self) -> GlossaryResult<Vec<ParsedKey>> {
        let keys = self.store.list_keys().await?;
        Ok(keys
            .iter()
            .filter(|k| k.starts_with(KEY_PREFIX))
            .filter_map(|k| {
                let parsed = parse_key(k);
                if parsed.is_none() {
                    tracing::debug!("Skipping malformed glossary key: {}", k);
                }
                parsed
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::GlossaryEntry;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn repo() -> Repository<MemoryStore> {
        Repository::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_load_missing_returns_default() {
        let glossary = repo().load("glossary_global_ja_en").await.unwrap();
        assert_eq!(glossary, Glossary { entries: vec![] });
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let repo = repo();
        let glossary = Glossary {
            entries: vec![GlossaryEntry::new(["リナ"], "Rina")],
        };
        repo.save("glossary_global_ja_en", &glossary).await.unwrap();
        assert_eq!(repo.load("glossary_global_ja_en").await.unwrap(), glossary);
    }

    #[tokio::test]
    async fn test_save_rejects_non_array_entries_without_writing() {
        let repo = repo();
        let key = "glossary_global_ja_en";
        let existing = Glossary {
            entries: vec![GlossaryEntry::new(["リナ"], "Rina")],
        };
        repo.save(key, &existing).await.unwrap();

        let err = repo
            .save_raw(key, json!({ "entries": "not-an-array" }))
            .await
            .unwrap_err();
        assert!(matches!(err, GlossaryError::Validation(_)));

        let err = repo.save_raw(key, json!({})).await.unwrap_err();
        assert!(matches!(err, GlossaryError::Validation(_)));

        assert_eq!(repo.load(key).await.unwrap(), existing);
    }

    #[tokio::test]
    async fn test_save_rejects_blank_keys() {
        let repo = repo();
        let err = repo
            .save_raw(
                "glossary_global_ja_en",
                json!({ "entries": [{ "keys": ["  "], "value": "x" }] }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GlossaryError::Validation(_)));
        assert!(repo.store.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = repo();
        repo.save("glossary_global_ja_en", &Glossary::default())
            .await
            .unwrap();
        repo.delete("glossary_global_ja_en").await.unwrap();
        repo.delete("glossary_global_ja_en").await.unwrap();
        assert!(repo.scan_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_all_skips_foreign_and_malformed() {
        let repo = Repository::new(MemoryStore::with_entries([
            ("glossary_global_ja_en", r#"{"entries":[]}"#),
            ("unrelated_key", "{}"),
            ("glossary_x", r#"{"entries":[]}"#),
        ]));
        let keys = repo.scan_all().await.unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].original_key, "glossary_global_ja_en");
    }

    #[tokio::test]
    async fn test_load_effective_layers_global() {
        let repo = repo();
        repo.save(
            "glossary_global_ja_en",
            &Glossary {
                entries: vec![
                    GlossaryEntry::new(["魔王"], "Demon Lord"),
                    GlossaryEntry::new(["王都"], "Royal Capital"),
                ],
            },
        )
        .await
        .unwrap();
        repo.save(
            "glossary_kakuyomu_my_series_ja_en",
            &Glossary {
                entries: vec![GlossaryEntry::new(["魔王"], "Overlord")],
            },
        )
        .await
        .unwrap();

        let key = parse_key("glossary_kakuyomu_my_series_ja_en").unwrap();
        let effective = repo.load_effective(&key).await.unwrap();
        assert_eq!(effective.len(), 2);
        assert_eq!(effective.lookup("魔王").unwrap().value, "Overlord");
        assert_eq!(effective.lookup("王都").unwrap().value, "Royal Capital");

        let global = parse_key("glossary_global_ja_en").unwrap();
        assert_eq!(repo.load_effective(&global).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_payload_surfaces_error() {
        let repo = Repository::new(MemoryStore::with_entries([(
            "glossary_global_ja_en",
            "not json",
        )]));
        let err = repo.load("glossary_global_ja_en").await.unwrap_err();
        assert!(matches!(err, GlossaryError::Serialization(_)));
    }
}
