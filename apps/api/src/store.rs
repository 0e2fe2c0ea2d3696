//! Ephemeral document store — generated PDFs live in process memory until a
//! background sweeper evicts them.
//!
//! Flow: handle_generate → put → (download reads via get) → sweeper evicts
//! entries older than the TTL. Nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::cards::deriver::CardFields;

/// Maximum age of a stored document before the sweeper removes it.
pub const DOCUMENT_TTL_SECS: i64 = 3600;
/// How often the sweeper wakes up to check for expired documents.
pub const SWEEP_INTERVAL_SECS: u64 = 300;

/// A generated card PDF held in memory. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub filename: String,
    pub bytes: Bytes,
    pub created_at: DateTime<Utc>,
    pub fields: CardFields,
}

/// Store abstraction so handlers and the sweeper share one injected instance.
/// `evict_expired` takes `now` as a parameter; tests inject a clock instead
/// of sleeping through the TTL.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores a freshly generated document and returns its filename identifier.
    async fn put(&self, bytes: Bytes, fields: CardFields) -> String;

    /// Looks up a document by filename. Reads do not consume the entry.
    async fn get(&self, filename: &str) -> Option<StoredDocument>;

    /// Removes every document strictly older than the TTL at `now`.
    /// Returns the number of evicted documents.
    async fn evict_expired(&self, now: DateTime<Utc>) -> usize;
}

/// In-memory `DocumentStore` backed by a `RwLock`-guarded map. Handler inserts
/// and sweeper deletes run concurrently, so the map must be synchronized.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, StoredDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put(&self, bytes: Bytes, fields: CardFields) -> String {
        // Collisions are treated as negligible for v4 identifiers.
        let filename = format!("greeting_card_{}.pdf", Uuid::new_v4());
        let document = StoredDocument {
            filename: filename.clone(),
            bytes,
            created_at: Utc::now(),
            fields,
        };
        self.inner.write().await.insert(filename.clone(), document);
        filename
    }

    async fn get(&self, filename: &str) -> Option<StoredDocument> {
        self.inner.read().await.get(filename).cloned()
    }

    async fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, doc| (now - doc.created_at).num_seconds() <= DOCUMENT_TTL_SECS);
        before - guard.len()
    }
}

/// Starts the single background sweeper task for the process lifetime.
/// The returned handle can be aborted to cancel the task.
pub fn spawn_sweeper(store: Arc<dyn DocumentStore>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            let evicted = store.evict_expired(Utc::now()).await;
            if evicted > 0 {
                info!("Sweeper evicted {evicted} expired card document(s)");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_fields() -> CardFields {
        CardFields {
            category: Some("Holiday".to_string()),
            occasion: Some("New Year's Eve!".to_string()),
            recipients: Some("Sam".to_string()),
            front_text: Some("Happy New Year".to_string()),
            inside_message: Some("Wishing you a bright year ahead, Sam!".to_string()),
        }
    }

    #[tokio::test]
    async fn test_put_then_get_round_trips() {
        let store = MemoryStore::new();
        let bytes = Bytes::from_static(b"%PDF-1.5 fake");

        let filename = store.put(bytes.clone(), sample_fields()).await;
        let doc = store.get(&filename).await.expect("document present");

        assert_eq!(doc.bytes, bytes);
        assert_eq!(doc.fields, sample_fields());
        assert_eq!(doc.filename, filename);
    }

    #[tokio::test]
    async fn test_filenames_are_unique_and_pdf_shaped() {
        let store = MemoryStore::new();
        let a = store.put(Bytes::from_static(b"a"), sample_fields()).await;
        let b = store.put(Bytes::from_static(b"b"), sample_fields()).await;

        assert_ne!(a, b);
        assert!(a.starts_with("greeting_card_"));
        assert!(a.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_get_unknown_returns_none() {
        let store = MemoryStore::new();
        assert!(store.get("greeting_card_missing.pdf").await.is_none());
    }

    #[tokio::test]
    async fn test_get_does_not_consume() {
        let store = MemoryStore::new();
        let filename = store.put(Bytes::from_static(b"x"), sample_fields()).await;

        assert!(store.get(&filename).await.is_some());
        assert!(store.get(&filename).await.is_some());
    }

    #[tokio::test]
    async fn test_sweep_evicts_documents_past_ttl() {
        let store = MemoryStore::new();
        let filename = store.put(Bytes::from_static(b"x"), sample_fields()).await;

        let future = Utc::now() + Duration::seconds(DOCUMENT_TTL_SECS + 60);
        let evicted = store.evict_expired(future).await;

        assert_eq!(evicted, 1);
        assert!(store.get(&filename).await.is_none());
    }

    #[tokio::test]
    async fn test_sweep_keeps_documents_under_ttl() {
        let store = MemoryStore::new();
        let filename = store.put(Bytes::from_static(b"x"), sample_fields()).await;

        let evicted = store.evict_expired(Utc::now()).await;

        assert_eq!(evicted, 0);
        assert!(store.get(&filename).await.is_some());
    }
}
