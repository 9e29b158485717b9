// Integration tests for bounded-window playback.
//
// A fake player records seek/play/pause calls and lets the test drive the
// position stream by hand, so window stop conditions can be checked
// deterministically.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use echotrain::{arm_window, AudioPlayer, PlaybackWindow};
use tokio::sync::broadcast;

struct FakePlayer {
    positions_tx: broadcast::Sender<f64>,
    seeks: std::sync::Mutex<Vec<f64>>,
    plays: AtomicUsize,
    pauses: AtomicUsize,
}

impl FakePlayer {
    fn new() -> Arc<Self> {
        let (positions_tx, _) = broadcast::channel(64);
        Arc::new(Self {
            positions_tx,
            seeks: std::sync::Mutex::new(Vec::new()),
            plays: AtomicUsize::new(0),
            pauses: AtomicUsize::new(0),
        })
    }

    fn emit(&self, pos: f64) {
        let _ = self.positions_tx.send(pos);
    }

    fn pause_count(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AudioPlayer for FakePlayer {
    async fn seek(&self, seconds: f64) -> Result<()> {
        self.seeks.lock().unwrap().push(seconds);
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.pauses.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn positions(&self) -> broadcast::Receiver<f64> {
        self.positions_tx.subscribe()
    }
}

async fn wait_for_pauses(player: &FakePlayer, expected: usize) {
    for _ in 0..100 {
        if player.pause_count() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "expected {} pauses, saw {}",
        expected,
        player.pause_count()
    );
}

#[tokio::test]
async fn window_stops_autonomously_at_end() -> Result<()> {
    let player = FakePlayer::new();
    let player_dyn: Arc<dyn AudioPlayer> = player.clone();

    let mut armed = arm_window(player_dyn, PlaybackWindow::new(1.0, 2.0)).await?;

    assert_eq!(player.seeks.lock().unwrap().as_slice(), &[1.0]);
    assert!(armed.is_playing());
    assert!(!armed.is_finished());

    player.emit(1.5);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(player.pause_count(), 0, "must not stop inside the window");

    player.emit(2.0);
    armed.wait_stopped().await;
    assert_eq!(player.pause_count(), 1);
    assert!(armed.is_finished());
    assert!(!armed.is_playing());

    Ok(())
}

#[tokio::test]
async fn rearming_disarms_the_previous_watch() -> Result<()> {
    let player = FakePlayer::new();
    let player_dyn: Arc<dyn AudioPlayer> = player.clone();

    let window_a = arm_window(player_dyn.clone(), PlaybackWindow::new(0.0, 5.0)).await?;
    // Replacing A with B is how sessions re-arm.
    drop(window_a);
    let _window_b = arm_window(player_dyn, PlaybackWindow::new(0.0, 100.0)).await?;

    // Past A's end but inside B: A's stop callback must not fire.
    player.emit(6.0);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(player.pause_count(), 0, "disarmed watch fired");

    // B's own stop condition still works.
    player.emit(150.0);
    wait_for_pauses(&player, 1).await;

    Ok(())
}

#[tokio::test]
async fn pause_and_resume_keep_the_watch_armed() -> Result<()> {
    let player = FakePlayer::new();
    let player_dyn: Arc<dyn AudioPlayer> = player.clone();

    let mut armed = arm_window(player_dyn, PlaybackWindow::new(0.0, 10.0)).await?;

    armed.pause().await?;
    assert!(!armed.is_playing());
    assert_eq!(player.pause_count(), 1);

    armed.resume().await?;
    assert!(armed.is_playing());
    assert_eq!(player.plays.load(Ordering::SeqCst), 2);

    // The stop-watch survived the pause/resume round trip.
    player.emit(10.0);
    armed.wait_stopped().await;
    assert!(armed.is_finished());

    Ok(())
}
