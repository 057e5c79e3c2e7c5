//! In-memory store of recent batch results, for lookup and export.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::models::BatchRow;

/// A finished batch.
#[derive(Debug, Clone, Serialize)]
pub struct StoredBatch {
    pub batch_id: String,
    pub created_at: DateTime<Utc>,
    pub summary: String,
    pub rows: Vec<BatchRow>,
}

/// Keeps the most recent `capacity` batches; the oldest is evicted first.
pub struct BatchStore {
    capacity: usize,
    batches: RwLock<VecDeque<StoredBatch>>,
}

impl BatchStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            batches: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Store a batch under a fresh UUID and return it.
    pub async fn insert(&self, summary: String, rows: Vec<BatchRow>) -> StoredBatch {
        let batch = StoredBatch {
            batch_id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            summary,
            rows,
        };

        let mut batches = self.batches.write().await;
        while batches.len() >= self.capacity {
            if let Some(evicted) = batches.pop_front() {
                tracing::debug!("Evicting batch {}", evicted.batch_id);
            }
        }
        batches.push_back(batch.clone());
        batch
    }

    pub async fn get(&self, batch_id: &str) -> Option<StoredBatch> {
        self.batches
            .read()
            .await
            .iter()
            .find(|b| b.batch_id == batch_id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.batches.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = BatchStore::new(4);
        let batch = store
            .insert("s".to_string(), vec![BatchRow::failed("a.png", "x")])
            .await;

        let found = store.get(&batch.batch_id).await.unwrap();
        assert_eq!(found.rows.len(), 1);
        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_oldest_evicted() {
        let store = BatchStore::new(2);
        let first = store.insert("1".to_string(), Vec::new()).await;
        let second = store.insert("2".to_string(), Vec::new()).await;
        let third = store.insert("3".to_string(), Vec::new()).await;

        assert_eq!(store.len().await, 2);
        assert!(store.get(&first.batch_id).await.is_none());
        assert!(store.get(&second.batch_id).await.is_some());
        assert!(store.get(&third.batch_id).await.is_some());
    }
}
