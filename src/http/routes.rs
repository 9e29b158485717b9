use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Upload flow
        .route("/articles/transcribe", post(handlers::transcribe_preview))
        // Articles
        .route(
            "/articles",
            get(handlers::list_articles).post(handlers::create_article),
        )
        .route(
            "/articles/:article_id",
            get(handlers::get_article).delete(handlers::delete_article),
        )
        .route("/articles/:article_id/audio", get(handlers::get_article_audio))
        // Dictation practice
        .route(
            "/articles/:article_id/practice/start",
            post(handlers::start_practice),
        )
        .route("/practice/:session_id/submit", post(handlers::practice_submit))
        .route("/practice/:session_id/skip", post(handlers::practice_skip))
        .route("/practice/:session_id/play", post(handlers::practice_play))
        .route("/practice/:session_id/lookup", post(handlers::practice_lookup))
        .route("/practice/:session_id/save", post(handlers::practice_save))
        .route("/practice/:session_id/close", post(handlers::practice_close))
        // Mini-story drills
        .route(
            "/articles/:article_id/ministory/start",
            post(handlers::start_ministory),
        )
        .route("/ministory/:session_id/answer", post(handlers::ministory_answer))
        .route(
            "/ministory/:session_id/replay-question",
            post(handlers::ministory_replay_question),
        )
        .route(
            "/ministory/:session_id/replay-answer",
            post(handlers::ministory_replay_answer),
        )
        .route("/ministory/:session_id/next", post(handlers::ministory_next))
        .route("/ministory/:session_id/close", post(handlers::ministory_close))
        // Vocabulary
        .route("/vocabulary", get(handlers::list_vocabulary))
        .route("/vocabulary/:word", delete(handlers::delete_vocabulary))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        // The frontend is served from its own origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
