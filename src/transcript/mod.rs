//! Transcript parsing
//!
//! Turns the free-form text a transcription oracle returns into ordered,
//! timed segments. The oracle is prompted to emit one utterance per line as
//!
//! ```text
//! [<start> -> <end>] <text>| <translation>
//! ```
//!
//! but partial/malformed lines are expected and skipped. Only a wholly
//! unparseable response is an error.

mod parser;

pub use parser::parse_transcript;
