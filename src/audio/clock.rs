use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

use super::player::AudioPlayer;

const TICK: Duration = Duration::from_millis(50);

/// Headless playback clock.
///
/// Keeps a playhead that advances in real time while "playing" and emits
/// position-change events, without touching any audio device. Used by the
/// service binary (the actual sound comes out of the client) and by tests
/// that need a live position stream.
pub struct ClockPlayer {
    positions_tx: broadcast::Sender<f64>,

    /// Current playhead, stored as f64 bits.
    position: Arc<AtomicU64>,

    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl ClockPlayer {
    pub fn new() -> Self {
        let (positions_tx, _) = broadcast::channel(64);
        Self {
            positions_tx,
            position: Arc::new(AtomicU64::new(0f64.to_bits())),
            ticker: Mutex::new(None),
        }
    }

    pub fn position(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::SeqCst))
    }
}

impl Default for ClockPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ClockPlayer {
    fn drop(&mut self) {
        if let Ok(mut ticker) = self.ticker.try_lock() {
            if let Some(handle) = ticker.take() {
                handle.abort();
            }
        }
    }
}

#[async_trait::async_trait]
impl AudioPlayer for ClockPlayer {
    async fn seek(&self, seconds: f64) -> Result<()> {
        let seconds = seconds.max(0.0);
        self.position.store(seconds.to_bits(), Ordering::SeqCst);
        let _ = self.positions_tx.send(seconds);
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        let mut ticker = self.ticker.lock().await;
        if ticker.is_some() {
            return Ok(());
        }

        let tx = self.positions_tx.clone();
        let position = Arc::clone(&self.position);

        *ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            interval.tick().await;
            let mut last = tokio::time::Instant::now();
            // Advance the shared playhead by elapsed wall time each tick.
            // Reading it back every tick means a seek during playback takes
            // effect on the next tick instead of being overwritten.
            loop {
                interval.tick().await;
                let now = tokio::time::Instant::now();
                let delta = now.duration_since(last).as_secs_f64();
                last = now;
                let pos = f64::from_bits(position.load(Ordering::SeqCst)) + delta;
                position.store(pos.to_bits(), Ordering::SeqCst);
                let _ = tx.send(pos);
            }
        }));
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        let mut ticker = self.ticker.lock().await;
        if let Some(handle) = ticker.take() {
            handle.abort();
        }
        Ok(())
    }

    fn positions(&self) -> broadcast::Receiver<f64> {
        self.positions_tx.subscribe()
    }
}
