use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ArticleStore, StoreError, VocabularyStore};
use crate::article::{Article, VocabularyItem};

/// In-memory store. Backs tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    articles: RwLock<HashMap<Uuid, Article>>,
    audio: RwLock<HashMap<Uuid, Vec<u8>>>,
    vocabulary: RwLock<HashMap<String, VocabularyItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
        Ok(self.articles.read().await.get(&id).cloned())
    }

    async fn put(&self, article: &Article) -> Result<(), StoreError> {
        self.articles
            .write()
            .await
            .insert(article.id, article.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.audio.write().await.remove(&id);
        self.articles
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        let mut articles: Vec<Article> = self.articles.read().await.values().cloned().collect();
        articles.sort_by_key(|a| a.next_review);
        Ok(articles)
    }

    async fn put_audio(&self, id: Uuid, bytes: &[u8]) -> Result<(), StoreError> {
        self.audio.write().await.insert(id, bytes.to_vec());
        Ok(())
    }

    async fn get_audio(&self, id: Uuid) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.audio.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl VocabularyStore for MemoryStore {
    async fn get(&self, word: &str) -> Result<Option<VocabularyItem>, StoreError> {
        Ok(self.vocabulary.read().await.get(word).cloned())
    }

    async fn put(&self, item: &VocabularyItem) -> Result<(), StoreError> {
        self.vocabulary
            .write()
            .await
            .insert(item.word.clone(), item.clone());
        Ok(())
    }

    async fn delete(&self, word: &str) -> Result<(), StoreError> {
        self.vocabulary
            .write()
            .await
            .remove(word)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(word.to_string()))
    }

    async fn list(&self) -> Result<Vec<VocabularyItem>, StoreError> {
        let mut items: Vec<VocabularyItem> =
            self.vocabulary.read().await.values().cloned().collect();
        items.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(items)
    }
}
