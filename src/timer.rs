use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Delay and sound timers. Only the executor loads them; ticking only ever
/// counts them down.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// One 60 Hz step. Returns `true` when the sound timer just reached zero.
    pub fn tick(&mut self) -> bool {
        let mut sound_stopped = false;
        if self.sound > 0 {
            self.sound -= 1;
            sound_stopped = self.sound == 0;
        }
        if self.delay > 0 {
            self.delay -= 1;
        }
        sound_stopped
    }
}

/// Background thread calling `tick` once per period until `tick` returns
/// `false` or the task is dropped.
pub struct TimerTask {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TimerTask {
    pub fn spawn<F>(period: Duration, mut tick: F) -> std::io::Result<Self>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("timers".into())
            .spawn(move || {
                log::debug!("timer task started, period {period:?}");
                let mut deadline = Instant::now() + period;
                while flag.load(Ordering::Acquire) {
                    if !tick() {
                        break;
                    }
                    let now = Instant::now();
                    if deadline > now {
                        thread::sleep(deadline - now);
                        deadline += period;
                    } else {
                        // fell behind (e.g. while paused), don't replay missed ticks
                        deadline = now + period;
                    }
                }
                log::debug!("timer task stopped");
            })?;
        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Asks the thread to finish after its current tick. `tick` must not be
    /// blocked forever when this is called.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("timer task panicked");
            }
        }
    }
}

impl Drop for TimerTask {
    fn drop(&mut self) {
        self.stop();
    }
}
