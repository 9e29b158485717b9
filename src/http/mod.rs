//! HTTP API for the browser frontend
//!
//! This module provides the REST glue around the core:
//! - POST /articles/transcribe - Transcribe uploaded audio into segments
//! - POST /articles - Create an article from reviewed segments
//! - GET  /articles - List articles, soonest review first
//! - GET  /articles/:id, /articles/:id/audio, DELETE /articles/:id
//! - POST /articles/:id/practice/start - Begin a dictation session
//! - POST /practice/:session_id/{submit,skip,play,lookup,save,close}
//! - POST /articles/:id/ministory/start - Begin a mini-story session
//! - POST /ministory/:session_id/{answer,replay-question,replay-answer,next,close}
//! - GET  /vocabulary, DELETE /vocabulary/:word
//! - GET  /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
