// Integration tests for the mini-story Q/A state machine.
//
// Playback runs on the headless clock player with very short windows so a
// full question/answer round trip takes well under a second of test time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use echotrain::speech::{SpeechCapture, SpeechEvent};
use echotrain::{
    Article, ArticleStore, CaptureError, ClockPlayer, MemoryStore, MiniStoryInteraction,
    MiniStorySession, MiniStoryState, Segment,
};
use tokio::sync::mpsc;

/// Capture that plays back a scripted event sequence.
struct ScriptedCapture {
    script: Vec<SpeechEvent>,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl ScriptedCapture {
    fn new(script: Vec<SpeechEvent>) -> Arc<Self> {
        Arc::new(Self {
            script,
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SpeechCapture for ScriptedCapture {
    async fn start(&self) -> Result<mpsc::Receiver<SpeechEvent>, CaptureError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(8);
        let script = self.script.clone();
        tokio::spawn(async move {
            for event in script {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }

    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Capture with no microphone permission.
struct DeniedCapture;

#[async_trait]
impl SpeechCapture for DeniedCapture {
    async fn start(&self) -> Result<mpsc::Receiver<SpeechEvent>, CaptureError> {
        Err(CaptureError::PermissionDenied)
    }

    async fn stop(&self) {}
}

fn story_article() -> Article {
    let mut article = Article::new(
        "mini story",
        vec![Segment {
            id: 0,
            text: "narration".into(),
            translation: None,
            start: 0.0,
            end: 1.0,
        }],
        "audio/mpeg",
    );
    article.mini_story_interactions = Some(vec![
        MiniStoryInteraction {
            question: "Where did the cat sit?".into(),
            answer: "The cat sat on the mat.".into(),
            question_start: 0.0,
            question_end: 0.05,
            answer_start: 0.1,
            answer_end: 0.15,
        },
        MiniStoryInteraction {
            question: "Who sat on the mat?".into(),
            answer: "The cat did.".into(),
            question_start: 0.2,
            question_end: 0.25,
            answer_start: 0.3,
            answer_end: 0.35,
        },
    ]);
    article
}

fn session_with(
    article: Article,
    store: Arc<MemoryStore>,
    capture: Arc<dyn SpeechCapture>,
) -> Result<MiniStorySession> {
    MiniStorySession::new(article, store, Arc::new(ClockPlayer::new()), capture)
}

#[tokio::test]
async fn question_capture_answer_round_trip() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let article = story_article();
    store.put(&article).await?;
    let capture = ScriptedCapture::new(vec![
        SpeechEvent::Interim("the cat".into()),
        SpeechEvent::Final("the cat sat on the mat".into()),
    ]);

    let mut session = session_with(article, store, capture.clone())?;
    assert_eq!(session.state(), MiniStoryState::Idle);

    session.start().await?;
    assert_eq!(session.state(), MiniStoryState::WaitingForUser);
    assert_eq!(capture.starts.load(Ordering::SeqCst), 1);

    session.wait_for_answer().await?;
    assert_eq!(session.state(), MiniStoryState::Review);
    assert_eq!(session.captured_transcript(), "the cat sat on the mat");
    assert!(session.capture_failure().is_none());

    Ok(())
}

#[tokio::test]
async fn permission_denial_is_flagged_and_manual_skip_proceeds() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let article = story_article();
    store.put(&article).await?;

    let mut session = session_with(article, store, Arc::new(DeniedCapture))?;
    session.start().await?;

    // Capture failed but the session still waits; the user goes on manually.
    assert_eq!(session.state(), MiniStoryState::WaitingForUser);
    assert_eq!(
        session.capture_failure(),
        Some(&CaptureError::PermissionDenied)
    );

    session.confirm_answered().await?;
    assert_eq!(session.state(), MiniStoryState::Review);
    assert_eq!(session.captured_transcript(), "");

    Ok(())
}

#[tokio::test]
async fn replays_do_not_change_state() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let article = story_article();
    store.put(&article).await?;
    let capture = ScriptedCapture::new(vec![SpeechEvent::Final("answer".into())]);

    let mut session = session_with(article, store, capture)?;
    session.start().await?;

    session.replay_question().await?;
    assert_eq!(session.state(), MiniStoryState::WaitingForUser);

    session.confirm_answered().await?;
    assert_eq!(session.state(), MiniStoryState::Review);

    session.replay_question().await?;
    assert_eq!(session.state(), MiniStoryState::Review);
    session.replay_answer().await?;
    assert_eq!(session.state(), MiniStoryState::Review);

    // Replaying the answer before review is refused.
    let mut early = session_with(
        story_article(),
        Arc::new(MemoryStore::new()),
        Arc::new(DeniedCapture),
    )?;
    early.start().await?;
    assert!(early.replay_answer().await.is_err());

    Ok(())
}

#[tokio::test]
async fn next_checkpoints_and_completion_reschedules() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let article = story_article();
    let id = article.id;
    store.put(&article).await?;
    let capture = ScriptedCapture::new(vec![SpeechEvent::Final("first answer".into())]);

    let mut session = session_with(article, store.clone(), capture)?;
    session.start().await?;
    session.wait_for_answer().await?;
    assert_eq!(session.state(), MiniStoryState::Review);

    // Continue: cursor checkpointed, second question plays, capture restarts.
    let state = session.next().await?;
    assert_eq!(state, MiniStoryState::WaitingForUser);
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.captured_transcript(), "", "fresh interaction, fresh transcript");

    let stored = store.get(id).await?.unwrap();
    assert_eq!(stored.current_segment_index, 1);
    assert_eq!(stored.stage, 0);

    // Finish the pass.
    session.wait_for_answer().await?;
    assert_eq!(session.state(), MiniStoryState::Review);
    let before = Utc::now();
    let state = session.next().await?;
    assert_eq!(state, MiniStoryState::Done);

    let stored = store.get(id).await?.unwrap();
    assert_eq!(stored.current_segment_index, 0, "cursor resets on completion");
    assert_eq!(stored.stage, 1);
    assert!(stored.next_review >= before + Duration::days(1));

    Ok(())
}

#[tokio::test]
async fn closing_stops_capture_without_checkpointing() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let article = story_article();
    let id = article.id;
    store.put(&article).await?;
    let capture = ScriptedCapture::new(vec![SpeechEvent::Interim("half an".into())]);

    let mut session = session_with(article, store.clone(), capture.clone())?;
    session.start().await?;
    session.close().await?;

    assert_eq!(capture.stops.load(Ordering::SeqCst), 1);
    let stored = store.get(id).await?.unwrap();
    assert_eq!(stored.current_segment_index, 0, "no checkpoint for an unconfirmed step");
    assert!(stored.last_practiced.is_none());

    Ok(())
}
