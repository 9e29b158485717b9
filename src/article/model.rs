use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One timed sentence unit of a transcript.
///
/// `start`/`end` are a half-open interval in seconds into the article's
/// audio asset; `0 <= start < end` once a segment is confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Stable synthetic id, assigned in file order by the parser.
    pub id: u32,

    /// Source-language sentence as transcribed.
    pub text: String,

    /// Optional secondary-language rendering.
    pub translation: Option<String>,

    /// Playback window start, seconds into the audio.
    pub start: f64,

    /// Playback window end, seconds into the audio.
    pub end: f64,
}

impl Segment {
    /// Whether the timing interval satisfies `0 <= start < end`.
    pub fn has_valid_interval(&self) -> bool {
        self.start >= 0.0 && self.start < self.end
    }
}

/// One question/answer unit of a mini-story drill. Both time intervals
/// index into the same audio asset as the article's segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiniStoryInteraction {
    pub question: String,
    pub answer: String,
    pub question_start: f64,
    pub question_end: f64,
    pub answer_start: f64,
    pub answer_end: f64,
}

impl MiniStoryInteraction {
    pub fn has_valid_intervals(&self) -> bool {
        self.question_start >= 0.0
            && self.question_start < self.question_end
            && self.answer_start >= 0.0
            && self.answer_start < self.answer_end
    }
}

/// The persistent unit of study.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,

    /// Creation instant; drives the long-term dormancy override.
    pub created_at: DateTime<Utc>,

    /// Last practice step, if any.
    pub last_practiced: Option<DateTime<Utc>>,

    /// Instant the next review becomes due. Never before `created_at`.
    pub next_review: DateTime<Utc>,

    /// Completed review cycles; 0 = never reviewed.
    pub stage: u32,

    /// Transcript segments in playback order.
    pub segments: Vec<Segment>,

    /// Resume cursor, `0 <= index <= segments.len()`. Reset to 0 exactly
    /// when a full pass over segments (or interactions) completes.
    pub current_segment_index: usize,

    /// Optional mini-story Q/A drill over the same audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mini_story_interactions: Option<Vec<MiniStoryInteraction>>,

    /// MIME type of the owned audio asset (the blob itself is persisted
    /// alongside this record, keyed by `id`).
    pub audio_mime: String,
}

impl Article {
    /// Create a new article from reviewed segments. Stage 0, cursor 0,
    /// immediately due for review.
    pub fn new(title: impl Into<String>, segments: Vec<Segment>, audio_mime: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at: now,
            last_practiced: None,
            next_review: now,
            stage: 0,
            segments,
            current_segment_index: 0,
            mini_story_interactions: None,
            audio_mime: audio_mime.into(),
        }
    }

    /// Checkpoint the resume cursor after one practice step.
    pub fn advance(&mut self, next_index: usize, now: DateTime<Utc>) {
        self.current_segment_index = next_index;
        self.last_practiced = Some(now);
    }

    /// Finish a full pass: reset the cursor and reschedule via the
    /// spaced-repetition policy (dormancy override takes precedence).
    pub fn complete_cycle(&mut self, now: DateTime<Utc>) {
        self.current_segment_index = 0;
        crate::scheduler::apply_completion(self, now);
    }
}

/// A saved word lookup. Independent lifecycle from any article; created
/// once per confirmed lookup-and-save, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub word: String,

    /// The segment text the word was found in.
    pub original_sentence: String,

    pub translation: String,
    pub definition: String,
    pub ipa: String,
    pub examples: Vec<String>,
    pub saved_at: DateTime<Utc>,
}
