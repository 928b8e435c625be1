//! Frame Ticker: Dedicated thread pacing fade animation frames.
//!
//! While a reply is streaming, entering units need a repaint every frame
//! even when no new token arrived, so the fade can progress. The ticker
//! provides that heartbeat without tying the UI loop to a sleep.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A tick event sent at regular intervals.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Frame number (monotonically increasing).
    pub frame: u64,
    /// When the tick fired.
    pub at: Instant,
}

/// Ticker actor that generates animation frames.
pub struct FrameTicker {
    /// Handle to the ticker thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Flag to suppress ticks while nothing animates.
    paused: Arc<AtomicBool>,
    /// Receiver for tick events.
    tick_rx: Receiver<Tick>,
}

impl FrameTicker {
    /// Spawn a ticker firing every `interval` (16ms is ~60 FPS).
    ///
    /// # Errors
    ///
    /// Returns an error if the OS fails to spawn the ticker thread.
    pub fn spawn(interval: Duration) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(false));

        // Ticks must not queue up behind a slow receiver.
        let (tick_tx, tick_rx) = bounded(1);

        let handle = {
            let shutdown = Arc::clone(&shutdown);
            let paused = Arc::clone(&paused);
            thread::Builder::new()
                .name("fadestream-ticker".to_string())
                .spawn(move || Self::run_loop(&tick_tx, &shutdown, &paused, interval))?
        };

        Ok(Self {
            handle: Some(handle),
            shutdown,
            paused,
            tick_rx,
        })
    }

    /// Get a reference to the tick receiver.
    ///
    /// Use this with `select!` next to the snapshot receiver:
    ///
    /// ```ignore
    /// select! {
    ///     recv(consumer.receiver()) -> snapshot => apply(snapshot),
    ///     recv(ticker.receiver()) -> _ => repaint(),
    /// }
    /// ```
    #[inline]
    pub const fn receiver(&self) -> &Receiver<Tick> {
        &self.tick_rx
    }

    /// Stop emitting ticks until [`FrameTicker::resume`].
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    /// Resume emitting ticks.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    /// Check if the ticker is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Signal the ticker to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the ticker thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main ticker loop.
    fn run_loop(
        tick_tx: &Sender<Tick>,
        shutdown: &AtomicBool,
        paused: &AtomicBool,
        interval: Duration,
    ) {
        let mut frame = 0u64;
        let mut next_tick = Instant::now() + interval;

        while !shutdown.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now < next_tick {
                thread::sleep((next_tick - now).min(Duration::from_millis(1)));
                continue;
            }

            if !paused.load(Ordering::Relaxed) {
                // Full buffer means the receiver is behind; drop the tick.
                let _ = tick_tx.try_send(Tick { frame, at: now });
                frame += 1;
            }

            next_tick += interval;
            // Fell behind: restart the schedule instead of bursting.
            if next_tick < now {
                next_tick = now + interval;
            }
        }
    }
}

impl Drop for FrameTicker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_basic() {
        let ticker = FrameTicker::spawn(Duration::from_millis(5)).unwrap();

        let tick = ticker.receiver().recv_timeout(Duration::from_millis(200));
        assert!(tick.is_ok());
        assert_eq!(tick.unwrap().frame, 0);

        let tick2 = ticker.receiver().recv_timeout(Duration::from_millis(200));
        assert!(tick2.unwrap().frame >= 1);

        ticker.join();
    }

    #[test]
    fn test_ticker_pause() {
        let ticker = FrameTicker::spawn(Duration::from_millis(2)).unwrap();
        ticker.pause();
        assert!(ticker.is_paused());

        // Drain anything sent before the pause took effect.
        thread::sleep(Duration::from_millis(10));
        while ticker.receiver().try_recv().is_ok() {}

        thread::sleep(Duration::from_millis(20));
        assert!(ticker.receiver().try_recv().is_err());

        ticker.resume();
        assert!(ticker.receiver().recv_timeout(Duration::from_millis(200)).is_ok());
        ticker.join();
    }

    #[test]
    fn test_ticker_shutdown() {
        let ticker = FrameTicker::spawn(Duration::from_millis(100)).unwrap();
        ticker.shutdown();
        thread::sleep(Duration::from_millis(20));
        ticker.join();
    }
}
