use std::time::Duration;

/// 60 Hz
pub const TIMER_PERIOD: Duration = Duration::from_micros(16_700);
/// ~700 Hz
pub const KEY_POLL_INTERVAL: Duration = Duration::from_micros(1_600);
pub const DEFAULT_CYCLE_HZ: u32 = 700;

/// What Fx55 / Fx65 leave in I once the block transfer is done.
///
/// The COSMAC VIP interpreter (and CHIP-48) walked I forward while copying,
/// SUPER-CHIP left it alone. Most ROMs in circulation expect the latter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexMode {
    /// I += x + 1
    Legacy,
    #[default]
    Unmodified,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub index_mode: IndexMode,
    pub timer_period: Duration,
    pub key_poll_interval: Duration,
    pub cycle_hz: u32,
    /// fixed seed for Cxkk, entropy when unset
    pub seed: Option<u64>,
}

impl Config {
    pub fn with_index_mode(mut self, mode: IndexMode) -> Self {
        self.index_mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs(1) / self.cycle_hz.max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_mode: IndexMode::default(),
            timer_period: TIMER_PERIOD,
            key_poll_interval: KEY_POLL_INTERVAL,
            cycle_hz: DEFAULT_CYCLE_HZ,
            seed: None,
        }
    }
}
