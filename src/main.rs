// Separately:
// CPU: ~700 times per second, on its own thread
// Display: 60 times per second, on the main thread (the window lives here)
// Timer: 60 times per second, owned by the Machine

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use chipvm::demo::DEMO_ROM;
use chipvm::sound::Tone;
use chipvm::window::{key_to_num, scale_for, FrameWindow};
use chipvm::{Config, IndexMode, Machine};
use clap::Parser;
use minifb::Key;

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 interpreter", long_about = None)]
struct Args {
    /// ROM to run; the built-in demo when omitted
    rom: Option<PathBuf>,

    /// Fx55/Fx65 leave I pointing past the copied registers
    #[arg(long)]
    legacy_index: bool,

    /// Instructions per second
    #[arg(long, default_value_t = chipvm::config::DEFAULT_CYCLE_HZ)]
    hz: u32,

    /// Fixed seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// Window scale factor
    #[arg(long, default_value_t = 16)]
    scale: u8,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            index_mode: if self.legacy_index {
                IndexMode::Legacy
            } else {
                IndexMode::Unmodified
            },
            cycle_hz: self.hz,
            seed: self.seed,
            ..Config::default()
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("chipvm=info"))
        .init();

    let args = Args::parse();
    let config = args.config();
    let cycle_period = config.cycle_period();

    let machine = match Machine::new(config) {
        Ok(machine) => Arc::new(machine),
        Err(err) => {
            log::error!("failed to start timers: {err}");
            return ExitCode::FAILURE;
        }
    };

    let loaded = match &args.rom {
        Some(path) => machine.load_rom_file(path),
        None => machine.load_rom(&DEMO_ROM),
    };
    if let Err(err) = loaded {
        log::error!("{err}");
        return ExitCode::FAILURE;
    }

    let mut window = match FrameWindow::new(scale_for(args.scale)) {
        Ok(window) => window,
        Err(err) => {
            log::error!("failed to open window: {err}");
            return ExitCode::FAILURE;
        }
    };
    machine.set_beep_handler(Tone::new());

    let running = Arc::new(AtomicBool::new(true));
    let cpu = {
        let machine = Arc::clone(&machine);
        let running = Arc::clone(&running);
        thread::spawn(move || match machine.run(cycle_period, &running) {
            Ok(()) => false,
            Err(err) => {
                log::error!("halted: {err}\n{}", machine.inspect());
                true
            }
        })
    };

    while running.load(Ordering::Acquire) && window.is_running() {
        if let Some(frame) = machine.take_frame() {
            window.render(&frame);
        }

        for key in window.keys_pressed() {
            match (key, key_to_num(key)) {
                (_, Some(num)) => {
                    if let Err(err) = machine.key_down(num) {
                        log::warn!("{err}");
                    }
                }
                (Key::P, _) if machine.is_paused() => machine.resume(),
                (Key::P, _) => machine.pause(),
                (Key::I, _) => log::info!("\n{}", machine.inspect()),
                _ => {}
            }
        }
        for key in window.keys_released() {
            if let Some(num) = key_to_num(key) {
                if let Err(err) = machine.key_up(num) {
                    log::warn!("{err}");
                }
            }
        }

        if let Err(err) = window.sync() {
            log::error!("failed to update window: {err}");
            break;
        }
    }

    running.store(false, Ordering::Release);
    // releases a cycle blocked on the pause gate or polling for a key
    machine.shutdown();
    match cpu.join() {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::FAILURE,
        Err(_) => {
            log::error!("cycle thread panicked");
            ExitCode::FAILURE
        }
    }
}
