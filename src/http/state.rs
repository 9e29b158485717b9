use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::oracle::{LookupOracle, TranscriptionOracle};
use crate::practice::{MiniStorySession, PracticeSession};
use crate::store::{ArticleStore, VocabularyStore};

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub articles: Arc<dyn ArticleStore>,
    pub vocabulary: Arc<dyn VocabularyStore>,
    pub transcriber: Arc<dyn TranscriptionOracle>,
    pub lookup: Arc<dyn LookupOracle>,

    /// Live dictation sessions (session id → session)
    pub practice: Arc<RwLock<HashMap<Uuid, Arc<Mutex<PracticeSession>>>>>,

    /// Live mini-story sessions (session id → session)
    pub ministories: Arc<RwLock<HashMap<Uuid, Arc<Mutex<MiniStorySession>>>>>,
}

impl AppState {
    pub fn new(
        articles: Arc<dyn ArticleStore>,
        vocabulary: Arc<dyn VocabularyStore>,
        transcriber: Arc<dyn TranscriptionOracle>,
        lookup: Arc<dyn LookupOracle>,
    ) -> Self {
        Self {
            articles,
            vocabulary,
            transcriber,
            lookup,
            practice: Arc::new(RwLock::new(HashMap::new())),
            ministories: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
