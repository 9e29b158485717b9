pub mod article;
pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod oracle;
pub mod practice;
pub mod scheduler;
pub mod speech;
pub mod store;
pub mod timecode;
pub mod transcript;

pub use article::{Article, MiniStoryInteraction, Segment, VocabularyItem};
pub use audio::{arm_window, ArmedWindow, AudioPlayer, ClockPlayer, PlaybackWindow};
pub use config::Config;
pub use error::{CaptureError, OracleError, StoreError, TranscriptError};
pub use http::{create_router, AppState};
pub use oracle::{LookupOracle, OracleConfig, TranscriptionOracle, WordCard};
pub use practice::{
    MiniStorySession, MiniStoryState, MismatchHint, PracticeSession, PracticeState, SubmitOutcome,
};
pub use scheduler::{compute_next_review, ReviewPlan};
pub use speech::{SpeechCapture, SpeechEvent};
pub use store::{ArticleStore, JsonFileStore, MemoryStore, VocabularyStore};
pub use transcript::parse_transcript;
