use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::matching::{self, MismatchHint};
use crate::article::{Article, Segment, VocabularyItem};
use crate::audio::{arm_window, ArmedWindow, AudioPlayer, PlaybackWindow};
use crate::oracle::{LookupOracle, WordCard};
use crate::store::{ArticleStore, VocabularyStore};

/// Where the session is within the current segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeState {
    /// Segment loaded, audio playing, waiting for typed input.
    AwaitingInput,

    /// Input was checked. A correct check arms the overloaded confirm
    /// action to advance instead of re-checking.
    Checked { correct: bool },

    /// The last segment was advanced past; the article has been
    /// rescheduled.
    Complete,
}

/// Result of one submit action.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Correct,
    Incorrect(MismatchHint),

    /// Confirm on an already-correct segment: moved to the next one.
    Advanced { next_index: usize },

    /// Advanced past the last segment; exactly one reschedule happened.
    SessionComplete,
}

/// Result of a per-word lookup request.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Ready(WordCard),

    /// A lookup for this word is already in flight; the caller should
    /// keep the word's trigger disabled.
    Pending,
}

enum LookupEntry {
    InFlight,
    Cached(WordCard),
}

/// One dictation pass over an article's segments.
///
/// Checkpoints are serialized: every step awaits its store write before
/// returning, so writes for an article are applied in step order. Dropping
/// the session mid-flight disarms playback and writes nothing for the
/// unconfirmed step; call [`PracticeSession::close`] to also pause the
/// player immediately.
pub struct PracticeSession {
    article: Article,
    store: Arc<dyn ArticleStore>,
    vocabulary: Arc<dyn VocabularyStore>,
    lookup_oracle: Arc<dyn LookupOracle>,
    player: Arc<dyn AudioPlayer>,
    state: PracticeState,
    armed: Option<ArmedWindow>,

    /// Per-word lookup cache, cleared on segment change. Dedupes both
    /// repeat and concurrent lookups of the same word within one segment.
    lookups: Mutex<HashMap<String, LookupEntry>>,
}

impl PracticeSession {
    /// Resume practice at the article's checkpointed cursor and start
    /// playback of that segment.
    pub async fn start(
        article: Article,
        store: Arc<dyn ArticleStore>,
        vocabulary: Arc<dyn VocabularyStore>,
        lookup_oracle: Arc<dyn LookupOracle>,
        player: Arc<dyn AudioPlayer>,
    ) -> Result<Self> {
        anyhow::ensure!(
            !article.segments.is_empty(),
            "article {} has no segments to practice",
            article.id
        );

        info!(
            "Starting practice session for article {} at segment {}",
            article.id, article.current_segment_index
        );

        let mut session = Self {
            article,
            store,
            vocabulary,
            lookup_oracle,
            player,
            state: PracticeState::AwaitingInput,
            armed: None,
            lookups: Mutex::new(HashMap::new()),
        };
        session.article.current_segment_index = session
            .article
            .current_segment_index
            .min(session.article.segments.len() - 1);
        session.arm_current().await?;
        Ok(session)
    }

    pub fn state(&self) -> PracticeState {
        self.state
    }

    pub fn article(&self) -> &Article {
        &self.article
    }

    pub fn current_index(&self) -> usize {
        self.article.current_segment_index
    }

    pub fn current_segment(&self) -> &Segment {
        &self.article.segments[self.article.current_segment_index]
    }

    /// Toggle playback of the current segment: arm it if idle, pause if
    /// playing, resume if paused, re-arm if it already ran to its end.
    pub async fn play(&mut self) -> Result<()> {
        match &self.armed {
            Some(w) if w.is_playing() => w.pause().await,
            Some(w) if !w.is_finished() => w.resume().await,
            _ => self.arm_current().await,
        }
    }

    /// The overloaded confirm action: checks the input, or advances when
    /// the current segment is already correct.
    pub async fn submit(&mut self, input: &str) -> Result<SubmitOutcome> {
        match self.state {
            PracticeState::Complete => Ok(SubmitOutcome::SessionComplete),
            PracticeState::Checked { correct: true } => self.advance().await,
            _ => {
                let target = &self.current_segment().text;
                if matching::matches(target, input) {
                    self.state = PracticeState::Checked { correct: true };
                    Ok(SubmitOutcome::Correct)
                } else {
                    let hint = matching::mismatch_hint(target, input);
                    self.state = PracticeState::Checked { correct: false };
                    Ok(SubmitOutcome::Incorrect(hint))
                }
            }
        }
    }

    /// Advance without requiring correctness. Still checkpoints.
    pub async fn skip(&mut self) -> Result<SubmitOutcome> {
        if self.state == PracticeState::Complete {
            return Ok(SubmitOutcome::SessionComplete);
        }
        self.advance().await
    }

    /// Look up a word of the *target* sentence, with per-segment caching
    /// and in-flight dedup. A failed lookup degrades to a placeholder card
    /// rather than failing the session.
    pub async fn lookup_word(&self, word: &str) -> LookupOutcome {
        let key = matching::normalize(word);

        {
            let mut lookups = self.lookups.lock().await;
            match lookups.get(&key) {
                Some(LookupEntry::Cached(card)) => return LookupOutcome::Ready(card.clone()),
                Some(LookupEntry::InFlight) => return LookupOutcome::Pending,
                None => {
                    lookups.insert(key.clone(), LookupEntry::InFlight);
                }
            }
        }

        let sentence = self.current_segment().text.clone();
        let card = match self.lookup_oracle.lookup(word, &sentence).await {
            Ok(card) => card,
            Err(e) => {
                warn!("lookup failed for \"{}\": {}", word, e);
                WordCard::placeholder(word)
            }
        };

        self.lookups
            .lock()
            .await
            .insert(key, LookupEntry::Cached(card.clone()));
        LookupOutcome::Ready(card)
    }

    /// Save a previously looked-up word to the vocabulary store.
    pub async fn save_word(&self, word: &str) -> Result<Option<VocabularyItem>> {
        let key = matching::normalize(word);
        let card = {
            let lookups = self.lookups.lock().await;
            match lookups.get(&key) {
                Some(LookupEntry::Cached(card)) => card.clone(),
                // Nothing confirmed to save yet.
                _ => return Ok(None),
            }
        };

        let item = VocabularyItem {
            word: word.to_string(),
            original_sentence: self.current_segment().text.clone(),
            translation: card.translation,
            definition: card.definition,
            ipa: card.ipa,
            examples: card.examples,
            saved_at: Utc::now(),
        };
        self.vocabulary.put(&item).await?;
        info!("Saved vocabulary item \"{}\"", item.word);
        Ok(Some(item))
    }

    /// Stop playback immediately and disarm. The current step stays
    /// unconfirmed and no checkpoint is written.
    pub async fn close(&mut self) -> Result<()> {
        self.armed = None;
        self.player.pause().await
    }

    async fn advance(&mut self) -> Result<SubmitOutcome> {
        // Disarm before anything else so the old stop-watch can't fire
        // into the next segment.
        self.armed = None;
        self.lookups.lock().await.clear();

        let now = Utc::now();
        let next_index = self.article.current_segment_index + 1;

        if next_index >= self.article.segments.len() {
            self.article.complete_cycle(now);
            self.store.put(&self.article).await?;
            self.state = PracticeState::Complete;
            info!(
                "Practice pass complete for article {}; next review {}",
                self.article.id, self.article.next_review
            );
            return Ok(SubmitOutcome::SessionComplete);
        }

        self.article.advance(next_index, now);
        self.store.put(&self.article).await?;
        self.state = PracticeState::AwaitingInput;
        self.arm_current().await?;
        Ok(SubmitOutcome::Advanced { next_index })
    }

    async fn arm_current(&mut self) -> Result<()> {
        let segment = self.current_segment();
        let window = PlaybackWindow::new(segment.start, segment.end);
        // Replacing the option disarms the previous window first.
        self.armed = None;
        self.armed = Some(arm_window(Arc::clone(&self.player), window).await?);
        Ok(())
    }
}
