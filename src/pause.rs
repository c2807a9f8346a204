use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct GateState {
    paused: bool,
    closed: bool,
}

/// Blocks the cycle driver and the timer task while the machine is paused.
///
/// Pausing twice is the same as pausing once, and resuming a running gate
/// does nothing. Closing the gate lets every waiter through for good so the
/// background threads can notice shutdown.
#[derive(Debug, Default)]
pub struct PauseGate {
    state: Mutex<GateState>,
    resumed: Condvar,
}

impl PauseGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the gate was newly engaged.
    pub fn pause(&self) -> bool {
        let mut state = self.state.lock();
        let engaged = !state.paused;
        state.paused = true;
        engaged
    }

    /// Returns whether a pending pause was released.
    pub fn resume(&self) -> bool {
        let mut state = self.state.lock();
        let released = state.paused;
        state.paused = false;
        if released {
            self.resumed.notify_all();
        }
        released
    }

    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.resumed.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Blocks while paused. Returns `false` once the gate has been closed.
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock();
        self.resumed.wait_while(&mut state, |s| s.paused && !s.closed);
        !state.closed
    }
}
