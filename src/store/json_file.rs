use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use super::{ArticleStore, StoreError, VocabularyStore};
use crate::article::{Article, VocabularyItem};

/// File-backed store: one JSON document per record, raw audio alongside.
///
/// Layout under the data directory:
///
/// ```text
/// articles/<uuid>.json
/// articles/<uuid>.audio
/// vocabulary/<encoded-word>.json
/// ```
///
/// Vocabulary filenames are URL-safe base64 of the word so arbitrary
/// unicode words map to valid, collision-free filenames.
pub struct JsonFileStore {
    articles_dir: PathBuf,
    vocabulary_dir: PathBuf,
}

impl JsonFileStore {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        let articles_dir = data_dir.join("articles");
        let vocabulary_dir = data_dir.join("vocabulary");
        fs::create_dir_all(&articles_dir).await?;
        fs::create_dir_all(&vocabulary_dir).await?;

        info!("Opened JSON store at {}", data_dir.display());

        Ok(Self {
            articles_dir,
            vocabulary_dir,
        })
    }

    fn article_path(&self, id: Uuid) -> PathBuf {
        self.articles_dir.join(format!("{}.json", id))
    }

    fn audio_path(&self, id: Uuid) -> PathBuf {
        self.articles_dir.join(format!("{}.audio", id))
    }

    fn vocabulary_path(&self, word: &str) -> PathBuf {
        let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(word.as_bytes());
        self.vocabulary_dir.join(format!("{}.json", encoded))
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        path: &Path,
    ) -> Result<Option<T>, StoreError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        // Write-then-rename so a crashed write never leaves a truncated record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn remove(path: &Path, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ArticleStore for JsonFileStore {
    async fn get(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
        Self::read_json(&self.article_path(id)).await
    }

    async fn put(&self, article: &Article) -> Result<(), StoreError> {
        Self::write_json(&self.article_path(article.id), article).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let _ = fs::remove_file(self.audio_path(id)).await;
        Self::remove(&self.article_path(id), &id.to_string()).await
    }

    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        let mut articles = Vec::new();
        let mut entries = fs::read_dir(&self.articles_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(article) = Self::read_json::<Article>(&path).await? {
                articles.push(article);
            }
        }
        articles.sort_by_key(|a| a.next_review);
        Ok(articles)
    }

    async fn put_audio(&self, id: Uuid, bytes: &[u8]) -> Result<(), StoreError> {
        fs::write(self.audio_path(id), bytes).await?;
        Ok(())
    }

    async fn get_audio(&self, id: Uuid) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.audio_path(id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl VocabularyStore for JsonFileStore {
    async fn get(&self, word: &str) -> Result<Option<VocabularyItem>, StoreError> {
        Self::read_json(&self.vocabulary_path(word)).await
    }

    async fn put(&self, item: &VocabularyItem) -> Result<(), StoreError> {
        Self::write_json(&self.vocabulary_path(&item.word), item).await
    }

    async fn delete(&self, word: &str) -> Result<(), StoreError> {
        Self::remove(&self.vocabulary_path(word), word).await
    }

    async fn list(&self) -> Result<Vec<VocabularyItem>, StoreError> {
        let mut items = Vec::new();
        let mut entries = fs::read_dir(&self.vocabulary_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(item) = Self::read_json::<VocabularyItem>(&path).await? {
                items.push(item);
            }
        }
        items.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(items)
    }
}
