//! Audio playback seam and bounded-window playback.
//!
//! The actual decoder/output device is an external primitive behind the
//! [`AudioPlayer`] trait: seek, play, pause, and a position-change
//! notification stream. On top of it, [`arm_window`] implements the one
//! playback behavior this crate owns: playing a `[start, end)` span and
//! stopping autonomously at `end`, with at most one armed window alive at
//! a time.

mod clock;
mod player;
mod window;

pub use clock::ClockPlayer;
pub use player::AudioPlayer;
pub use window::{arm_window, ArmedWindow, PlaybackWindow};
