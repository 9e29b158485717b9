use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use super::player::AudioPlayer;

/// A `[start, end)` span of the audio asset, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackWindow {
    pub start: f64,
    pub end: f64,
}

impl PlaybackWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// An armed playback window: playback is running and a watcher task will
/// pause the player once the playhead reaches `end`.
///
/// At most one window may be armed at a time. Dropping an `ArmedWindow`
/// disarms it: the watcher is aborted and can never fire afterwards,
/// so replacing a session's armed window with a new one is sufficient to
/// prevent two stop-conditions racing.
pub struct ArmedWindow {
    player: Arc<dyn AudioPlayer>,
    window: PlaybackWindow,
    watcher: JoinHandle<()>,
    stopped: watch::Receiver<bool>,
    playing: Arc<AtomicBool>,
}

/// Seek to the window start, begin playback, and arm the stop-watcher.
pub async fn arm_window(
    player: Arc<dyn AudioPlayer>,
    window: PlaybackWindow,
) -> Result<ArmedWindow> {
    // Subscribe before playback starts so no position event is missed.
    let mut positions = player.positions();

    player.seek(window.start).await?;
    player.play().await?;

    let (stopped_tx, stopped_rx) = watch::channel(false);
    let playing = Arc::new(AtomicBool::new(true));

    let watcher = tokio::spawn({
        let player = Arc::clone(&player);
        let playing = Arc::clone(&playing);
        let end = window.end;
        async move {
            loop {
                match positions.recv().await {
                    Ok(pos) if pos >= end => {
                        if let Err(e) = player.pause().await {
                            warn!("failed to pause at window end: {}", e);
                        }
                        playing.store(false, Ordering::SeqCst);
                        let _ = stopped_tx.send(true);
                        break;
                    }
                    Ok(_) => {}
                    // Lagged subscribers keep watching; a closed stream
                    // means the player is gone.
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    });

    Ok(ArmedWindow {
        player,
        window,
        watcher,
        stopped: stopped_rx,
        playing,
    })
}

impl ArmedWindow {
    pub fn window(&self) -> PlaybackWindow {
        self.window
    }

    /// Whether the window is currently audible (armed and not paused).
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    /// Whether the watcher has already stopped playback at `end`.
    pub fn is_finished(&self) -> bool {
        *self.stopped.borrow()
    }

    /// Pause without disarming; the watcher stays armed for a resume.
    pub async fn pause(&self) -> Result<()> {
        self.player.pause().await?;
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Resume playback inside the same window.
    pub async fn resume(&self) -> Result<()> {
        self.player.play().await?;
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Wait until the watcher stops playback at the window end.
    pub async fn wait_stopped(&mut self) {
        // An aborted watcher drops the sender; treat that as stopped.
        let _ = self.stopped.wait_for(|stopped| *stopped).await;
    }
}

impl Drop for ArmedWindow {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}
