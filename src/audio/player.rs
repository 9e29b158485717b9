use anyhow::Result;
use tokio::sync::broadcast;

/// Playback primitive for the article's audio asset.
///
/// Implementations wrap whatever actually produces sound (a browser
/// `<audio>` element, a native output stream, a test fake). Position
/// notifications are event-driven; implementations must not require
/// busy-loop polling from callers.
#[async_trait::async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Move the playhead to `seconds` into the asset.
    async fn seek(&self, seconds: f64) -> Result<()>;

    /// Begin or resume playback at the current playhead.
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping the playhead.
    async fn pause(&self) -> Result<()>;

    /// Subscribe to playhead position changes (seconds into the asset).
    fn positions(&self) -> broadcast::Receiver<f64>;
}
