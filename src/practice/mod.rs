//! Practice session state machines.
//!
//! `PracticeSession` drives segment-by-segment dictation: bounded playback
//! of the current segment, comparison of typed input against the target
//! sentence, hinting on mismatch, and checkpointing the article's resume
//! cursor after every step. `MiniStorySession` is the stricter Q/A variant
//! that alternates spoken-question playback, live speech capture, and
//! spoken-answer playback.

pub mod matching;
mod ministory;
mod session;

pub use matching::{matches, mismatch_hint, normalize, MismatchHint};
pub use ministory::{MiniStorySession, MiniStoryState};
pub use session::{LookupOutcome, PracticeSession, PracticeState, SubmitOutcome};
