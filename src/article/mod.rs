//! Core data model: articles, segments, mini-story interactions and saved
//! vocabulary.
//!
//! An `Article` is the persistent unit of study: one audio asset, its
//! reviewed transcript segments (and optionally mini-story interactions),
//! plus the spaced-repetition schedule state. The raw audio blob is
//! persisted alongside the record by the store, keyed by article id.

mod model;

pub use model::{Article, MiniStoryInteraction, Segment, VocabularyItem};
