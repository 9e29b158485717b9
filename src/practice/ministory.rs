use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::article::{Article, MiniStoryInteraction};
use crate::audio::{arm_window, ArmedWindow, AudioPlayer, PlaybackWindow};
use crate::error::CaptureError;
use crate::speech::{SpeechCapture, SpeechEvent};
use crate::store::ArticleStore;

/// Explicit states of the mini-story drill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiniStoryState {
    Idle,
    PlayingQuestion,
    WaitingForUser,
    PlayingAnswer,
    Review,
    Done,
}

/// One pass over an article's mini-story interactions.
///
/// Each interaction alternates bounded playback of the question window,
/// live speech capture of the user's answer, and bounded playback of the
/// model answer. At most one of {capture, playback} is active at any
/// instant: starting either stops the other first.
pub struct MiniStorySession {
    article: Article,
    interactions: Vec<MiniStoryInteraction>,
    index: usize,
    state: MiniStoryState,
    store: Arc<dyn ArticleStore>,
    player: Arc<dyn AudioPlayer>,
    capture: Arc<dyn SpeechCapture>,
    armed: Option<ArmedWindow>,
    capture_rx: Option<mpsc::Receiver<SpeechEvent>>,

    /// Best transcript captured so far for the current interaction
    /// (interim results are superseded, the final one sticks).
    captured: String,

    /// Set when capture failed for the current interaction. Non-fatal:
    /// the user proceeds manually.
    capture_failure: Option<CaptureError>,
}

impl MiniStorySession {
    pub fn new(
        article: Article,
        store: Arc<dyn ArticleStore>,
        player: Arc<dyn AudioPlayer>,
        capture: Arc<dyn SpeechCapture>,
    ) -> Result<Self> {
        let interactions = article
            .mini_story_interactions
            .clone()
            .unwrap_or_default();
        anyhow::ensure!(
            !interactions.is_empty(),
            "article {} has no mini-story interactions",
            article.id
        );

        let index = article.current_segment_index.min(interactions.len() - 1);

        Ok(Self {
            article,
            interactions,
            index,
            state: MiniStoryState::Idle,
            store,
            player,
            capture,
            armed: None,
            capture_rx: None,
            captured: String::new(),
            capture_failure: None,
        })
    }

    pub fn state(&self) -> MiniStoryState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_interaction(&self) -> &MiniStoryInteraction {
        &self.interactions[self.index]
    }

    /// Transcript captured for the current interaction so far (possibly
    /// empty), for self-comparison in `Review`.
    pub fn captured_transcript(&self) -> &str {
        &self.captured
    }

    pub fn capture_failure(&self) -> Option<&CaptureError> {
        self.capture_failure.as_ref()
    }

    /// Begin the drill: play the current question, then start listening.
    pub async fn start(&mut self) -> Result<()> {
        anyhow::ensure!(
            self.state == MiniStoryState::Idle,
            "mini-story session already started"
        );
        self.play_question_and_listen().await
    }

    /// Wait in `WaitingForUser` until the capture produces a final
    /// transcript, then play the model answer. Capture failures are
    /// flagged and leave the session waiting for a manual
    /// [`MiniStorySession::confirm_answered`].
    pub async fn wait_for_answer(&mut self) -> Result<()> {
        anyhow::ensure!(
            self.state == MiniStoryState::WaitingForUser,
            "not waiting for an answer"
        );

        let Some(mut rx) = self.capture_rx.take() else {
            return Ok(());
        };

        loop {
            match rx.recv().await {
                Some(SpeechEvent::Interim(text)) => self.captured = text,
                Some(SpeechEvent::Final(text)) => {
                    self.captured = text;
                    self.capture.stop().await;
                    return self.play_answer().await;
                }
                Some(SpeechEvent::Failed(e)) => {
                    warn!("speech capture failed: {}", e);
                    self.capture_failure = Some(e);
                    self.capture.stop().await;
                    return Ok(());
                }
                None => return Ok(()),
            }
        }
    }

    /// Manual "I answered" action: stop capturing and play the model
    /// answer, keeping whatever transcript (possibly none) was captured.
    pub async fn confirm_answered(&mut self) -> Result<()> {
        anyhow::ensure!(
            self.state == MiniStoryState::WaitingForUser,
            "not waiting for an answer"
        );

        // Drain any interim results that arrived before the stop.
        if let Some(mut rx) = self.capture_rx.take() {
            while let Ok(event) = rx.try_recv() {
                match event {
                    SpeechEvent::Interim(text) | SpeechEvent::Final(text) => self.captured = text,
                    SpeechEvent::Failed(e) => self.capture_failure = Some(e),
                }
            }
            self.capture.stop().await;
        }
        self.play_answer().await
    }

    /// Replay the question window. Available once the question has played;
    /// does not change the session state.
    pub async fn replay_question(&mut self) -> Result<()> {
        anyhow::ensure!(
            matches!(
                self.state,
                MiniStoryState::WaitingForUser | MiniStoryState::Review
            ),
            "question replay not available in this state"
        );
        let it = self.current_interaction();
        let window = PlaybackWindow::new(it.question_start, it.question_end);
        self.arm(window).await
    }

    /// Replay the answer window. Available from `Review`; does not change
    /// the session state.
    pub async fn replay_answer(&mut self) -> Result<()> {
        anyhow::ensure!(
            self.state == MiniStoryState::Review,
            "answer replay not available in this state"
        );
        let it = self.current_interaction();
        let window = PlaybackWindow::new(it.answer_start, it.answer_end);
        self.arm(window).await
    }

    /// Leave `Review`: checkpoint the cursor and either continue with the
    /// next question or finish the pass (which reschedules the article).
    pub async fn next(&mut self) -> Result<MiniStoryState> {
        anyhow::ensure!(
            self.state == MiniStoryState::Review,
            "nothing to continue from"
        );

        let now = Utc::now();

        if self.index + 1 >= self.interactions.len() {
            self.article.complete_cycle(now);
            self.store.put(&self.article).await?;
            self.state = MiniStoryState::Done;
            info!(
                "Mini-story pass complete for article {}; next review {}",
                self.article.id, self.article.next_review
            );
            return Ok(self.state);
        }

        self.index += 1;
        self.article.advance(self.index, now);
        self.store.put(&self.article).await?;

        self.captured.clear();
        self.capture_failure = None;
        self.play_question_and_listen().await?;
        Ok(self.state)
    }

    /// Stop playback and capture immediately without checkpointing the
    /// current, unconfirmed step.
    pub async fn close(&mut self) -> Result<()> {
        self.stop_capture().await;
        self.armed = None;
        self.player.pause().await
    }

    pub fn article(&self) -> &Article {
        &self.article
    }

    async fn play_question_and_listen(&mut self) -> Result<()> {
        let it = self.current_interaction().clone();
        self.state = MiniStoryState::PlayingQuestion;

        let window = PlaybackWindow::new(it.question_start, it.question_end);
        self.arm(window).await?;
        if let Some(armed) = self.armed.as_mut() {
            armed.wait_stopped().await;
        }
        self.armed = None;

        self.state = MiniStoryState::WaitingForUser;
        match self.capture.start().await {
            Ok(rx) => self.capture_rx = Some(rx),
            Err(e) => {
                warn!("could not start speech capture: {}", e);
                self.capture_failure = Some(e);
            }
        }
        Ok(())
    }

    async fn play_answer(&mut self) -> Result<()> {
        self.stop_capture().await;
        self.state = MiniStoryState::PlayingAnswer;

        let it = self.current_interaction().clone();
        let window = PlaybackWindow::new(it.answer_start, it.answer_end);
        self.arm(window).await?;
        if let Some(armed) = self.armed.as_mut() {
            armed.wait_stopped().await;
        }
        self.armed = None;

        self.state = MiniStoryState::Review;
        Ok(())
    }

    async fn arm(&mut self, window: PlaybackWindow) -> Result<()> {
        // Playback and capture are mutually exclusive, and re-arming
        // disarms the previous stop-watch.
        self.stop_capture().await;
        self.armed = None;
        self.armed = Some(arm_window(Arc::clone(&self.player), window).await?);
        Ok(())
    }

    async fn stop_capture(&mut self) {
        if self.capture_rx.take().is_some() {
            self.capture.stop().await;
        }
    }
}
