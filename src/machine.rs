use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};

use crate::config::Config;
use crate::display::Frame;
use crate::emulator::{Emulator, Step};
use crate::error::{Chip8Error, Result};
use crate::pause::PauseGate;
use crate::sound::BeepSink;
use crate::timer::TimerTask;

/// An `Emulator` shared between the caller's cycle loop and a 60 Hz timer
/// thread.
///
/// Every cycle and every timer tick takes the machine lock once, and only
/// after passing the pause gate. Once `pause` returns nothing touches the
/// machine state until `resume`.
pub struct Machine {
    emu: Arc<Mutex<Emulator>>,
    gate: Arc<PauseGate>,
    key_poll_interval: Duration,
    timer: Mutex<Option<TimerTask>>,
}

impl Machine {
    /// Builds the machine and starts its timer thread.
    pub fn new(config: Config) -> std::io::Result<Self> {
        let emu = Arc::new(Mutex::new(Emulator::new(&config)));
        let gate = Arc::new(PauseGate::new());

        let timer = {
            let emu = Arc::clone(&emu);
            let gate = Arc::clone(&gate);
            TimerTask::spawn(config.timer_period, move || {
                match lock_unpaused(&emu, &gate) {
                    Some(mut emu) => {
                        emu.sync_timers();
                        true
                    }
                    None => false,
                }
            })?
        };

        log::info!("machine started ({:?} store/load)", config.index_mode);
        Ok(Self {
            emu,
            gate,
            key_poll_interval: config.key_poll_interval,
            timer: Mutex::new(Some(timer)),
        })
    }

    pub fn load_rom(&self, rom: &[u8]) -> Result<()> {
        self.lock().load_rom(rom)
    }

    pub fn load_rom_file(&self, path: impl AsRef<Path>) -> Result<()> {
        self.lock().load_rom_by_file(path)
    }

    pub fn set_beep_handler(&self, sink: impl BeepSink + 'static) {
        self.lock().set_beep_handler(sink);
    }

    /// Runs one fetch/decode/execute cycle.
    ///
    /// Blocks while paused. An FX0A with no key latched keeps polling every
    /// `key_poll_interval`, dropping the lock and passing the pause gate
    /// between polls, so timers keep running and a pause still takes hold.
    pub fn run_cycle(&self) -> Result<()> {
        loop {
            let step = {
                let mut emu = lock_unpaused(&self.emu, &self.gate).ok_or(Chip8Error::Shutdown)?;
                emu.tick()?
            };
            match step {
                Step::Continue => return Ok(()),
                Step::AwaitingKey => thread::sleep(self.key_poll_interval),
            }
        }
    }

    /// Runs cycles every `period` until `running` drops or the machine shuts
    /// down. A guest fault stops the loop and is returned; `running` is
    /// lowered either way.
    pub fn run(&self, period: Duration, running: &AtomicBool) -> Result<()> {
        let mut next = Instant::now();
        let outcome = loop {
            if !running.load(Ordering::Acquire) {
                break Ok(());
            }
            match self.run_cycle() {
                Ok(()) => {}
                Err(Chip8Error::Shutdown) => break Ok(()),
                Err(err) => break Err(err),
            }
            next += period;
            let now = Instant::now();
            if next > now {
                thread::sleep(next - now);
            } else {
                next = now;
            }
        };
        running.store(false, Ordering::Release);
        outcome
    }

    /// Engages the pause gate and waits out whatever cycle or tick is in
    /// flight.
    pub fn pause(&self) {
        if self.gate.pause() {
            log::info!("paused");
        }
        drop(self.lock());
    }

    pub fn resume(&self) {
        if self.gate.resume() {
            log::info!("resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    /// Stops the timer thread and releases anyone blocked on the pause gate.
    /// Cycles run after this fail with `Shutdown`.
    pub fn shutdown(&self) {
        self.gate.close();
        let timer = self.timer.lock().take();
        if let Some(mut timer) = timer {
            timer.stop();
        }
    }

    pub fn key_down(&self, key: u8) -> Result<()> {
        self.lock().key_down(key)
    }

    pub fn key_up(&self, key: u8) -> Result<()> {
        self.lock().key_up(key)
    }

    /// Copy of the screen if it changed since the last call; lowers the
    /// redraw flag.
    pub fn take_frame(&self) -> Option<Frame> {
        let mut emu = self.lock();
        if !emu.fb.needs_redraw() {
            return None;
        }
        emu.fb.clear_redraw();
        Some(*emu.fb.frame())
    }

    pub fn inspect(&self) -> String {
        self.lock().inspect()
    }

    /// Direct access to the machine state, bypassing the pause gate.
    pub fn lock(&self) -> MutexGuard<'_, Emulator> {
        self.emu.lock()
    }
}

impl Drop for Machine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Passes the gate, then locks. The gate is checked again under the lock so a
/// pause that landed in between still wins. `None` once the gate is closed.
fn lock_unpaused<'a>(
    emu: &'a Mutex<Emulator>,
    gate: &PauseGate,
) -> Option<MutexGuard<'a, Emulator>> {
    loop {
        if !gate.wait() {
            return None;
        }
        let guard = emu.lock();
        if gate.is_closed() {
            return None;
        }
        if !gate.is_paused() {
            return Some(guard);
        }
    }
}
