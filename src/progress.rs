//! Render progress reporting.
//!
//! Workers post their latest status into a per-worker slot without ever
//! blocking; a reporter thread periodically logs the slot that is furthest
//! behind.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Interval between progress log lines
pub const REPORT_INTERVAL: Duration = Duration::from_millis(100);

/// Latest status of one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressMessage {
    /// Frame the worker is on; `u64::MAX` until it starts
    pub frame: u64,
    pub line: String,
}

impl ProgressMessage {
    fn waiting() -> Self {
        Self {
            frame: u64::MAX,
            line: "waiting".to_string(),
        }
    }
}

/// Latest-message-wins slots shared between workers and the reporter
#[derive(Debug)]
pub struct ProgressBoard {
    slots: Mutex<Vec<ProgressMessage>>,
    started: Instant,
}

impl ProgressBoard {
    pub fn new(workers: usize) -> Self {
        Self {
            slots: Mutex::new(vec![ProgressMessage::waiting(); workers.max(1)]),
            started: Instant::now(),
        }
    }

    /// Replace a worker's slot. Dropped (returns false) if the board is busy.
    pub fn post(&self, worker: usize, message: ProgressMessage) -> bool {
        let mut slots = match self.slots.try_lock() {
            Ok(slots) => slots,
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
            Err(TryLockError::WouldBlock) => return false,
        };
        let len = slots.len();
        slots[worker % len] = message;
        true
    }

    /// The slot with the lowest frame; later slots win ties
    pub fn earliest(&self) -> Option<ProgressMessage> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .iter()
            .fold(None::<&ProgressMessage>, |best, slot| match best {
                Some(best) if best.frame < slot.frame => Some(best),
                _ => Some(slot),
            })
            .cloned()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// `frame N (t/d)\tremaining: HhMmSs`, extrapolated from elapsed time
pub fn status_line(frame: u64, time: f64, duration_s: f64, elapsed: Duration) -> String {
    let ratio = if duration_s > 0.0 { time / duration_s } else { 0.0 };
    let remaining = if ratio > 0.0 {
        let seconds = (elapsed.as_secs_f64() * (1.0 - ratio) / ratio).max(0.0).round() as u64;
        format!("{}h{}m{}s", seconds / 3600, seconds / 60 % 60, seconds % 60)
    } else {
        "?".to_string()
    };
    format!(
        "frame {} ({}/{})\tremaining: {}",
        frame,
        time.round(),
        duration_s.round(),
        remaining
    )
}

/// Handle to the background reporter thread
pub struct ProgressReporter {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Spawn a thread that logs the earliest worker status every `interval`
    pub fn spawn(board: Arc<ProgressBoard>, interval: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let mut last = String::new();
            while !flag.load(Ordering::Relaxed) {
                thread::sleep(interval);
                if let Some(message) = board.earliest() {
                    if message.frame != u64::MAX && message.line != last {
                        log::info!("{}", message.line);
                        last = message.line;
                    }
                }
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stop the reporter and wait for it
    pub fn finish(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("progress reporter panicked");
            }
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
