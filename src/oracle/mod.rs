//! External generative-oracle seams.
//!
//! Transcription and word lookup are delegated to an external service this
//! crate treats as an opaque, possibly-failing oracle. Only the traits and
//! the structured error kinds live here; concrete clients are constructed
//! from an explicit [`OracleConfig`] at session start, so business logic
//! never reads credentials ambiently.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use crate::error::OracleError;

/// Credentials and model selection for oracle clients, loaded from the
/// service config and threaded into constructors.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    pub api_key: String,
    pub model: String,
}

/// Result of one word lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCard {
    pub translation: String,
    pub definition: String,
    pub ipa: String,
    pub examples: Vec<String>,
}

impl WordCard {
    /// Degraded content shown when a lookup fails. Non-fatal: practice
    /// continues with this in place of oracle output.
    pub fn placeholder(word: &str) -> Self {
        Self {
            translation: "—".to_string(),
            definition: format!("Lookup failed for \"{}\". Try again later.", word),
            ipa: String::new(),
            examples: Vec::new(),
        }
    }
}

/// Audio-in, transcript-out. The response grammar is parsed by
/// [`crate::transcript::parse_transcript`].
#[async_trait]
pub trait TranscriptionOracle: Send + Sync {
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, OracleError>;
}

/// Word lookup within the sentence it was found in.
#[async_trait]
pub trait LookupOracle: Send + Sync {
    async fn lookup(&self, word: &str, context_sentence: &str) -> Result<WordCard, OracleError>;
}

/// Wiring point for a concrete vendor client.
///
/// Holds the configured credentials but ships no transport; every call
/// reports an auth-kind failure telling the operator to wire a client.
/// Swapping in a real implementation replaces this one type.
pub struct UnconfiguredOracle {
    config: OracleConfig,
}

impl UnconfiguredOracle {
    pub fn new(config: OracleConfig) -> Self {
        Self { config }
    }

    fn unavailable(&self) -> OracleError {
        OracleError::Auth(format!(
            "no oracle transport bundled for model \"{}\"",
            self.config.model
        ))
    }
}

#[async_trait]
impl TranscriptionOracle for UnconfiguredOracle {
    async fn transcribe(&self, _audio: &[u8], _mime_type: &str) -> Result<String, OracleError> {
        Err(self.unavailable())
    }
}

#[async_trait]
impl LookupOracle for UnconfiguredOracle {
    async fn lookup(&self, _word: &str, _sentence: &str) -> Result<WordCard, OracleError> {
        Err(self.unavailable())
    }
}
