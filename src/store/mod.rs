//! Persistent store seam and the two bundled implementations.
//!
//! Articles and vocabulary items are key-addressed records. The store is
//! an external collaborator as far as the session machines are concerned,
//! so it is a trait here; `MemoryStore` backs tests and `JsonFileStore`
//! persists one JSON document per record with the raw audio blob alongside.

mod json_file;
mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::article::{Article, VocabularyItem};
pub use crate::error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Key-addressed storage for articles and their audio assets.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Article>, StoreError>;

    /// Insert or replace the whole record. Checkpoints during practice are
    /// read-modify-write of the record, serialized by the caller.
    async fn put(&self, article: &Article) -> Result<(), StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// All articles, ordered by `next_review` ascending (soonest due first).
    async fn list(&self) -> Result<Vec<Article>, StoreError>;

    /// Persist the raw audio asset owned by an article.
    async fn put_audio(&self, id: Uuid, bytes: &[u8]) -> Result<(), StoreError>;

    async fn get_audio(&self, id: Uuid) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Key-addressed storage for saved word lookups, keyed by the word itself.
#[async_trait]
pub trait VocabularyStore: Send + Sync {
    async fn get(&self, word: &str) -> Result<Option<VocabularyItem>, StoreError>;

    async fn put(&self, item: &VocabularyItem) -> Result<(), StoreError>;

    async fn delete(&self, word: &str) -> Result<(), StoreError>;

    /// All saved items, ordered by `saved_at` descending (newest first).
    async fn list(&self) -> Result<Vec<VocabularyItem>, StoreError>;
}
