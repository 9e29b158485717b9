use thiserror::Error;

/// Transcript parsing failures.
///
/// Individual malformed lines are skipped silently by the parser; the only
/// fatal condition is a response that yields no segments at all.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// The oracle response contained no parseable segment lines.
    #[error("transcript contained no parseable segments")]
    Empty,
}

/// Failures signaled by the external generative oracles (transcription,
/// word lookup). The kind is decided once at the collaborator boundary so
/// callers never probe error shapes.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    /// Rate/quota limit hit; surfaced to the user with a distinct prompt
    /// to adjust credentials.
    #[error("oracle quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Invalid or missing credentials.
    #[error("oracle authentication failed: {0}")]
    Auth(String),

    /// Anything else (network, malformed response, server error).
    #[error("oracle request failed: {0}")]
    Other(String),
}

/// Speech-capture failures. Non-fatal: sessions flag them and let the user
/// proceed manually.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("speech capture failed: {0}")]
    Runtime(String),
}

/// Persistent store failures. Always propagated: a failed checkpoint must
/// never be treated as if it was applied.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
