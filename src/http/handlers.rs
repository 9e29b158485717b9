use super::state::AppState;
use crate::article::{Article, MiniStoryInteraction, Segment, VocabularyItem};
use crate::audio::ClockPlayer;
use crate::error::{OracleError, TranscriptError};
use crate::practice::{
    LookupOutcome, MiniStorySession, MiniStoryState, MismatchHint, PracticeSession, SubmitOutcome,
};
use crate::speech::NoCapture;
use crate::transcript::parse_transcript;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TranscribeRequest {
    /// Base64-encoded audio bytes
    pub audio: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,

    /// Base64-encoded audio bytes
    pub audio: String,
    pub mime_type: String,

    /// Reviewed segments (edits/reorders applied client-side)
    pub segments: Vec<Segment>,

    pub mini_story_interactions: Option<Vec<MiniStoryInteraction>>,
}

#[derive(Debug, Serialize)]
pub struct ArticleListItem {
    #[serde(flatten)]
    pub article: Article,

    /// Advisory "mastered" badge; scheduling continues regardless.
    pub mastered: bool,
}

#[derive(Debug, Serialize)]
pub struct PracticeStartResponse {
    pub session_id: Uuid,
    pub index: usize,
    pub total: usize,
    pub segment: Segment,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct PracticeStepResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<MismatchHint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<Segment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
}

impl PracticeStepResponse {
    fn status(status: &'static str) -> Self {
        Self {
            status,
            hint: None,
            next_index: None,
            segment: None,
            next_review: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WordRequest {
    pub word: String,
}

#[derive(Debug, Serialize)]
pub struct MiniStoryStepResponse {
    pub state: &'static str,
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<String>,
    pub capture_flagged: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn state_name(state: MiniStoryState) -> &'static str {
    match state {
        MiniStoryState::Idle => "idle",
        MiniStoryState::PlayingQuestion => "playing_question",
        MiniStoryState::WaitingForUser => "waiting_for_user",
        MiniStoryState::PlayingAnswer => "playing_answer",
        MiniStoryState::Review => "review",
        MiniStoryState::Done => "done",
    }
}

fn ministory_step(session: &MiniStorySession) -> MiniStoryStepResponse {
    let it = session.current_interaction();
    let state = session.state();
    MiniStoryStepResponse {
        state: state_name(state),
        index: session.current_index(),
        question: Some(it.question.clone()),
        answer: matches!(state, MiniStoryState::Review | MiniStoryState::Done)
            .then(|| it.answer.clone()),
        captured: Some(session.captured_transcript().to_string()),
        capture_flagged: session.capture_failure().is_some(),
    }
}

fn error_json(status: StatusCode, msg: impl Into<String>) -> axum::response::Response {
    (status, Json(ErrorResponse { error: msg.into() })).into_response()
}

/// Oracle failures map to distinct statuses so the client can prompt for
/// credential fixes on quota/auth instead of showing a generic failure.
fn oracle_error(e: OracleError) -> axum::response::Response {
    let status = match e {
        OracleError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
        OracleError::Auth(_) => StatusCode::UNAUTHORIZED,
        OracleError::Other(_) => StatusCode::BAD_GATEWAY,
    };
    error_json(status, e.to_string())
}

// ============================================================================
// Upload flow
// ============================================================================

/// POST /articles/transcribe
/// Transcribe uploaded audio and return the parsed segment preview
pub async fn transcribe_preview(
    State(state): State<AppState>,
    Json(req): Json<TranscribeRequest>,
) -> impl IntoResponse {
    let audio = match base64::engine::general_purpose::STANDARD.decode(&req.audio) {
        Ok(bytes) => bytes,
        Err(e) => return error_json(StatusCode::BAD_REQUEST, format!("invalid audio: {}", e)),
    };

    info!("Transcribing {} bytes of {}", audio.len(), req.mime_type);

    let raw = match state.transcriber.transcribe(&audio, &req.mime_type).await {
        Ok(raw) => raw,
        Err(e) => {
            error!("Transcription failed: {}", e);
            return oracle_error(e);
        }
    };

    match parse_transcript(&raw) {
        Ok(segments) => (StatusCode::OK, Json(TranscribeResponse { segments })).into_response(),
        Err(TranscriptError::Empty) => {
            // Fatal to the upload flow: no partial article gets created.
            error_json(
                StatusCode::UNPROCESSABLE_ENTITY,
                "transcription returned no usable sentences",
            )
        }
    }
}

/// POST /articles
/// Create an article from reviewed segments
pub async fn create_article(
    State(state): State<AppState>,
    Json(req): Json<CreateArticleRequest>,
) -> impl IntoResponse {
    let audio = match base64::engine::general_purpose::STANDARD.decode(&req.audio) {
        Ok(bytes) => bytes,
        Err(e) => return error_json(StatusCode::BAD_REQUEST, format!("invalid audio: {}", e)),
    };

    if req.segments.is_empty() {
        return error_json(StatusCode::UNPROCESSABLE_ENTITY, "no segments provided");
    }
    // The reviewer step: intervals must be sane before practice begins.
    if let Some(bad) = req.segments.iter().find(|s| !s.has_valid_interval()) {
        return error_json(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("segment {} has an invalid time interval", bad.id),
        );
    }
    if let Some(interactions) = &req.mini_story_interactions {
        if interactions.iter().any(|i| !i.has_valid_intervals()) {
            return error_json(
                StatusCode::UNPROCESSABLE_ENTITY,
                "a mini-story interaction has an invalid time interval",
            );
        }
    }

    let mut article = Article::new(req.title, req.segments, req.mime_type);
    article.mini_story_interactions = req.mini_story_interactions;

    if let Err(e) = state.articles.put_audio(article.id, &audio).await {
        error!("Failed to store audio: {}", e);
        return error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }
    if let Err(e) = state.articles.put(&article).await {
        error!("Failed to store article: {}", e);
        return error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    info!("Created article {} ({})", article.id, article.title);

    (StatusCode::CREATED, Json(article)).into_response()
}

// ============================================================================
// Articles
// ============================================================================

/// GET /articles
/// List articles, soonest review first
pub async fn list_articles(State(state): State<AppState>) -> impl IntoResponse {
    match state.articles.list().await {
        Ok(articles) => {
            let items: Vec<ArticleListItem> = articles
                .into_iter()
                .map(|article| ArticleListItem {
                    mastered: crate::scheduler::compute_next_review(article.stage, Utc::now())
                        .finished,
                    article,
                })
                .collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// GET /articles/:article_id
pub async fn get_article(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.articles.get(article_id).await {
        Ok(Some(article)) => (StatusCode::OK, Json(article)).into_response(),
        Ok(None) => error_json(
            StatusCode::NOT_FOUND,
            format!("Article {} not found", article_id),
        ),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// GET /articles/:article_id/audio
/// The raw audio asset, with its stored MIME type
pub async fn get_article_audio(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> impl IntoResponse {
    let article = match state.articles.get(article_id).await {
        Ok(Some(article)) => article,
        Ok(None) => {
            return error_json(
                StatusCode::NOT_FOUND,
                format!("Article {} not found", article_id),
            )
        }
        Err(e) => return error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    match state.articles.get_audio(article_id).await {
        Ok(Some(bytes)) => {
            ([(header::CONTENT_TYPE, article.audio_mime)], bytes).into_response()
        }
        Ok(None) => error_json(
            StatusCode::NOT_FOUND,
            format!("No audio stored for article {}", article_id),
        ),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// DELETE /articles/:article_id
pub async fn delete_article(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.articles.delete(article_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(crate::error::StoreError::NotFound(_)) => error_json(
            StatusCode::NOT_FOUND,
            format!("Article {} not found", article_id),
        ),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

// ============================================================================
// Dictation practice
// ============================================================================

/// POST /articles/:article_id/practice/start
pub async fn start_practice(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> impl IntoResponse {
    let article = match state.articles.get(article_id).await {
        Ok(Some(article)) => article,
        Ok(None) => {
            return error_json(
                StatusCode::NOT_FOUND,
                format!("Article {} not found", article_id),
            )
        }
        Err(e) => return error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let session = match PracticeSession::start(
        article,
        Arc::clone(&state.articles),
        Arc::clone(&state.vocabulary),
        Arc::clone(&state.lookup),
        Arc::new(ClockPlayer::new()),
    )
    .await
    {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to start practice: {}", e);
            return error_json(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
        }
    };

    let response = PracticeStartResponse {
        session_id: Uuid::new_v4(),
        index: session.current_index(),
        total: session.article().segments.len(),
        segment: session.current_segment().clone(),
    };

    state
        .practice
        .write()
        .await
        .insert(response.session_id, Arc::new(Mutex::new(session)));

    info!(
        "Practice session {} started for article {}",
        response.session_id, article_id
    );

    (StatusCode::OK, Json(response)).into_response()
}

async fn practice_session(
    state: &AppState,
    session_id: Uuid,
) -> Option<Arc<Mutex<PracticeSession>>> {
    state.practice.read().await.get(&session_id).cloned()
}

/// Map a submit/skip outcome to its response; `true` means the session
/// finished and should be dropped from the live map.
fn step_response(
    session: &PracticeSession,
    outcome: SubmitOutcome,
) -> (bool, PracticeStepResponse) {
    match outcome {
        SubmitOutcome::Correct => (false, PracticeStepResponse::status("correct")),
        SubmitOutcome::Incorrect(hint) => {
            let mut resp = PracticeStepResponse::status("incorrect");
            resp.hint = Some(hint);
            (false, resp)
        }
        SubmitOutcome::Advanced { next_index } => {
            let mut resp = PracticeStepResponse::status("advanced");
            resp.next_index = Some(next_index);
            resp.segment = Some(session.current_segment().clone());
            (false, resp)
        }
        SubmitOutcome::SessionComplete => {
            let mut resp = PracticeStepResponse::status("complete");
            resp.next_review = Some(session.article().next_review);
            (true, resp)
        }
    }
}

/// POST /practice/:session_id/submit
/// The overloaded confirm action: check input, or continue when correct
pub async fn practice_submit(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SubmitRequest>,
) -> impl IntoResponse {
    let Some(session) = practice_session(&state, session_id).await else {
        return error_json(
            StatusCode::NOT_FOUND,
            format!("Practice session {} not found", session_id),
        );
    };

    let mut session = session.lock().await;
    match session.submit(&req.input).await {
        Ok(outcome) => {
            let (finished, resp) = step_response(&session, outcome);
            drop(session);
            if finished {
                state.practice.write().await.remove(&session_id);
            }
            (StatusCode::OK, Json(resp)).into_response()
        }
        Err(e) => {
            error!("Practice step failed: {}", e);
            error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// POST /practice/:session_id/skip
pub async fn practice_skip(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(session) = practice_session(&state, session_id).await else {
        return error_json(
            StatusCode::NOT_FOUND,
            format!("Practice session {} not found", session_id),
        );
    };

    let mut session = session.lock().await;
    match session.skip().await {
        Ok(outcome) => {
            let (finished, resp) = step_response(&session, outcome);
            drop(session);
            if finished {
                state.practice.write().await.remove(&session_id);
            }
            (StatusCode::OK, Json(resp)).into_response()
        }
        Err(e) => {
            error!("Skip failed: {}", e);
            error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// POST /practice/:session_id/play
/// Toggle playback of the current segment window
pub async fn practice_play(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(session) = practice_session(&state, session_id).await else {
        return error_json(
            StatusCode::NOT_FOUND,
            format!("Practice session {} not found", session_id),
        );
    };

    let mut session = session.lock().await;
    match session.play().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// POST /practice/:session_id/lookup
pub async fn practice_lookup(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<WordRequest>,
) -> impl IntoResponse {
    let Some(session) = practice_session(&state, session_id).await else {
        return error_json(
            StatusCode::NOT_FOUND,
            format!("Practice session {} not found", session_id),
        );
    };

    let session = session.lock().await;
    match session.lookup_word(&req.word).await {
        LookupOutcome::Ready(card) => (StatusCode::OK, Json(card)).into_response(),
        LookupOutcome::Pending => StatusCode::ACCEPTED.into_response(),
    }
}

/// POST /practice/:session_id/save
/// Save a looked-up word to the vocabulary store
pub async fn practice_save(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<WordRequest>,
) -> impl IntoResponse {
    let Some(session) = practice_session(&state, session_id).await else {
        return error_json(
            StatusCode::NOT_FOUND,
            format!("Practice session {} not found", session_id),
        );
    };

    let session = session.lock().await;
    match session.save_word(&req.word).await {
        Ok(Some(item)) => (StatusCode::CREATED, Json(item)).into_response(),
        Ok(None) => error_json(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("\"{}\" has not been looked up in this segment", req.word),
        ),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// POST /practice/:session_id/close
/// Abandon the session; the unconfirmed step is not checkpointed
pub async fn practice_close(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    let session = state.practice.write().await.remove(&session_id);
    match session {
        Some(session) => {
            if let Err(e) = session.lock().await.close().await {
                error!("Failed to close practice session: {}", e);
            }
            StatusCode::NO_CONTENT.into_response()
        }
        None => error_json(
            StatusCode::NOT_FOUND,
            format!("Practice session {} not found", session_id),
        ),
    }
}

// ============================================================================
// Mini-story drills
// ============================================================================

/// POST /articles/:article_id/ministory/start
/// Plays the first question, then waits for the user's spoken answer
pub async fn start_ministory(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> impl IntoResponse {
    let article = match state.articles.get(article_id).await {
        Ok(Some(article)) => article,
        Ok(None) => {
            return error_json(
                StatusCode::NOT_FOUND,
                format!("Article {} not found", article_id),
            )
        }
        Err(e) => return error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let mut session = match MiniStorySession::new(
        article,
        Arc::clone(&state.articles),
        Arc::new(ClockPlayer::new()),
        Arc::new(NoCapture),
    ) {
        Ok(session) => session,
        Err(e) => return error_json(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    };

    if let Err(e) = session.start().await {
        error!("Failed to start mini-story: {}", e);
        return error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    let session_id = Uuid::new_v4();
    let step = ministory_step(&session);
    state
        .ministories
        .write()
        .await
        .insert(session_id, Arc::new(Mutex::new(session)));

    info!(
        "Mini-story session {} started for article {}",
        session_id, article_id
    );

    (
        StatusCode::OK,
        Json(serde_json::json!({ "session_id": session_id, "step": step })),
    )
        .into_response()
}

async fn ministory_session(
    state: &AppState,
    session_id: Uuid,
) -> Option<Arc<Mutex<MiniStorySession>>> {
    state.ministories.read().await.get(&session_id).cloned()
}

/// POST /ministory/:session_id/answer
/// The manual "I answered" action; plays the model answer
pub async fn ministory_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(session) = ministory_session(&state, session_id).await else {
        return error_json(
            StatusCode::NOT_FOUND,
            format!("Mini-story session {} not found", session_id),
        );
    };

    let mut session = session.lock().await;
    match session.confirm_answered().await {
        Ok(()) => (StatusCode::OK, Json(ministory_step(&session))).into_response(),
        Err(e) => error_json(StatusCode::CONFLICT, e.to_string()),
    }
}

/// POST /ministory/:session_id/replay-question
pub async fn ministory_replay_question(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(session) = ministory_session(&state, session_id).await else {
        return error_json(
            StatusCode::NOT_FOUND,
            format!("Mini-story session {} not found", session_id),
        );
    };

    let mut session = session.lock().await;
    match session.replay_question().await {
        Ok(()) => (StatusCode::OK, Json(ministory_step(&session))).into_response(),
        Err(e) => error_json(StatusCode::CONFLICT, e.to_string()),
    }
}

/// POST /ministory/:session_id/replay-answer
pub async fn ministory_replay_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(session) = ministory_session(&state, session_id).await else {
        return error_json(
            StatusCode::NOT_FOUND,
            format!("Mini-story session {} not found", session_id),
        );
    };

    let mut session = session.lock().await;
    match session.replay_answer().await {
        Ok(()) => (StatusCode::OK, Json(ministory_step(&session))).into_response(),
        Err(e) => error_json(StatusCode::CONFLICT, e.to_string()),
    }
}

/// POST /ministory/:session_id/next
/// Checkpoint and continue to the next interaction, or finish the pass
pub async fn ministory_next(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(session) = ministory_session(&state, session_id).await else {
        return error_json(
            StatusCode::NOT_FOUND,
            format!("Mini-story session {} not found", session_id),
        );
    };

    let mut session = session.lock().await;
    match session.next().await {
        Ok(MiniStoryState::Done) => {
            let step = ministory_step(&session);
            drop(session);
            state.ministories.write().await.remove(&session_id);
            (StatusCode::OK, Json(step)).into_response()
        }
        Ok(_) => (StatusCode::OK, Json(ministory_step(&session))).into_response(),
        Err(e) => {
            error!("Mini-story step failed: {}", e);
            error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// POST /ministory/:session_id/close
pub async fn ministory_close(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    let session = state.ministories.write().await.remove(&session_id);
    match session {
        Some(session) => {
            if let Err(e) = session.lock().await.close().await {
                error!("Failed to close mini-story session: {}", e);
            }
            StatusCode::NO_CONTENT.into_response()
        }
        None => error_json(
            StatusCode::NOT_FOUND,
            format!("Mini-story session {} not found", session_id),
        ),
    }
}

// ============================================================================
// Vocabulary
// ============================================================================

/// GET /vocabulary
/// Saved items, newest first
pub async fn list_vocabulary(State(state): State<AppState>) -> impl IntoResponse {
    match state.vocabulary.list().await {
        Ok(items) => (StatusCode::OK, Json::<Vec<VocabularyItem>>(items)).into_response(),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// DELETE /vocabulary/:word
pub async fn delete_vocabulary(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> impl IntoResponse {
    match state.vocabulary.delete(&word).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(crate::error::StoreError::NotFound(_)) => error_json(
            StatusCode::NOT_FOUND,
            format!("\"{}\" is not in the vocabulary", word),
        ),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
