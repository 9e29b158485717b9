//! Live speech-capture seam.
//!
//! The browser/OS speech-to-text capability is modeled as an event source:
//! starting a capture yields a channel of interim and final transcript
//! events for a single utterance. Permission denial is a distinguished,
//! non-fatal condition; mini-story sessions flag it and let the user
//! proceed manually.

use async_trait::async_trait;
use tokio::sync::mpsc;

pub use crate::error::CaptureError;

/// One event from an in-progress capture.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    /// Partial hypothesis; superseded by later events.
    Interim(String),

    /// Final transcript for the utterance. Ends the capture.
    Final(String),

    /// Capture failed. Ends the capture; non-fatal to the session.
    Failed(CaptureError),
}

/// Single-utterance speech capture.
#[async_trait]
pub trait SpeechCapture: Send + Sync {
    /// Begin capturing one utterance. Events arrive on the returned
    /// channel until a `Final` or `Failed` event.
    async fn start(&self) -> Result<mpsc::Receiver<SpeechEvent>, CaptureError>;

    /// Stop an in-progress capture. Idempotent.
    async fn stop(&self);
}

/// Capture backend for environments with no microphone access (the
/// headless service binary). Every start reports permission denial, which
/// sessions treat as the non-fatal "proceed manually" condition.
pub struct NoCapture;

#[async_trait]
impl SpeechCapture for NoCapture {
    async fn start(&self) -> Result<mpsc::Receiver<SpeechEvent>, CaptureError> {
        Err(CaptureError::PermissionDenied)
    }

    async fn stop(&self) {}
}
