//! Loading and querying the support dataset

use super::types::{Column, DatasetError, SupportRecord};
use crate::embedding::Embedder;
use crate::llm::BackendError;
use std::path::Path;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// In-memory view of the customer support dataset.
///
/// Records are loaded once and shared read-only across all tools. Record
/// embeddings (used by semantic search and clustering) are expensive, so
/// they are computed on first use and memoized for the process lifetime.
pub struct DatasetStore {
    records: Vec<SupportRecord>,
    embeddings: OnceCell<Vec<Vec<f32>>>,
}

impl DatasetStore {
    /// Loads the dataset from a JSON file containing an array of records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let records: Vec<SupportRecord> = serde_json::from_str(&content)?;
        if records.is_empty() {
            return Err(DatasetError::Empty);
        }

        info!(
            path = %path.display(),
            records = records.len(),
            "Loaded support dataset"
        );

        Ok(Self::from_records(records))
    }

    /// Builds a store directly from records. Used by tests and fixtures.
    pub fn from_records(records: Vec<SupportRecord>) -> Self {
        Self {
            records,
            embeddings: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SupportRecord] {
        &self.records
    }

    /// Column names in display order.
    pub fn columns(&self) -> Vec<&'static str> {
        Column::ALL.iter().map(|c| c.as_str()).collect()
    }

    /// Sorted unique categories.
    pub fn categories(&self) -> Vec<String> {
        self.unique_values(Column::Category)
    }

    /// Sorted unique intents.
    pub fn intents(&self) -> Vec<String> {
        self.unique_values(Column::Intent)
    }

    /// Sorted unique flags.
    pub fn flags(&self) -> Vec<String> {
        self.unique_values(Column::Flags)
    }

    fn unique_values(&self, column: Column) -> Vec<String> {
        let mut values: Vec<String> = self
            .records
            .iter()
            .map(|r| r.field(column).to_string())
            .collect();
        values.sort();
        values.dedup();
        values
    }

    /// Embeddings for every record, computed once per process.
    ///
    /// Each record is embedded as `instruction + " " + response` so that a
    /// query can match either side of the exchange.
    pub async fn record_embeddings(
        &self,
        embedder: &dyn Embedder,
    ) -> Result<&[Vec<f32>], BackendError> {
        let embeddings = self
            .embeddings
            .get_or_try_init(|| async {
                info!(records = self.records.len(), "Computing record embeddings");
                let texts: Vec<String> = self
                    .records
                    .iter()
                    .map(|r| format!("{} {}", r.instruction, r.response))
                    .collect();
                let embeddings = embedder.embed_batch(&texts).await?;
                debug!(count = embeddings.len(), "Record embeddings ready");
                Ok(embeddings)
            })
            .await?;
        Ok(embeddings)
    }
}

impl std::fmt::Debug for DatasetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetStore")
            .field("records", &self.records.len())
            .field("embeddings_ready", &self.embeddings.initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbedder;

    fn sample_records() -> Vec<SupportRecord> {
        vec![
            SupportRecord {
                instruction: "I want to cancel my order".to_string(),
                response: "I can help with that cancellation.".to_string(),
                category: "ORDER".to_string(),
                intent: "cancel_order".to_string(),
                flags: "B".to_string(),
            },
            SupportRecord {
                instruction: "where is my refund".to_string(),
                response: "Let me check the refund status.".to_string(),
                category: "REFUND".to_string(),
                intent: "track_refund".to_string(),
                flags: "BL".to_string(),
            },
            SupportRecord {
                instruction: "cancel order 123".to_string(),
                response: "Order 123 has been cancelled.".to_string(),
                category: "ORDER".to_string(),
                intent: "cancel_order".to_string(),
                flags: "B".to_string(),
            },
        ]
    }

    #[test]
    fn test_from_records() {
        let store = DatasetStore::from_records(sample_records());
        assert_eq!(store.len(), 3);
        assert!(!store.is_empty());
    }

    #[test]
    fn test_unique_values_sorted() {
        let store = DatasetStore::from_records(sample_records());

        assert_eq!(store.categories(), vec!["ORDER", "REFUND"]);
        assert_eq!(store.intents(), vec!["cancel_order", "track_refund"]);
        assert_eq!(store.flags(), vec!["B", "BL"]);
    }

    #[test]
    fn test_columns() {
        let store = DatasetStore::from_records(sample_records());
        assert_eq!(
            store.columns(),
            vec!["instruction", "response", "category", "intent", "flags"]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = DatasetStore::load("/nonexistent/bitext.json");
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }

    #[test]
    fn test_load_rejects_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "[]").unwrap();

        let result = DatasetStore::load(&path);
        assert!(matches!(result, Err(DatasetError::Empty)));
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = DatasetStore::load(&path);
        assert!(matches!(result, Err(DatasetError::Parse(_))));
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bitext.json");
        let json = serde_json::to_string(&sample_records()).unwrap();
        std::fs::write(&path, json).unwrap();

        let store = DatasetStore::load(&path).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.records()[0].intent, "cancel_order");
    }

    #[tokio::test]
    async fn test_record_embeddings_memoized() {
        let store = DatasetStore::from_records(sample_records());
        let embedder = MockEmbedder::new(8);

        let first = store.record_embeddings(&embedder).await.unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first[0].len(), 8);

        // Second call must not re-embed
        store.record_embeddings(&embedder).await.unwrap();
        assert_eq!(embedder.batch_calls(), 1);
    }
}
