//! CHIP-8 interpreter core.
//!
//! 16 8-bit data registers named V0 to VF, an address register I, a 16-slot
//! return stack, 4K of memory with the font at 0x050 and programs at 0x200,
//! delay & sound timers counting down at 60 Hz, a 64x32 monochrome screen
//! and a 16-key hex pad.
//!
//! [`Emulator`] is the single-threaded machine. [`Machine`] shares it with a
//! background timer thread behind one lock and a pause gate; a host drives it
//! by calling [`Machine::run_cycle`] in a loop, feeds keys in, and pulls
//! frames out with [`Machine::take_frame`].

pub mod config;
pub mod decode;
pub mod demo;
pub mod display;
pub mod emulator;
pub mod error;
pub mod keyboard;
pub mod machine;
pub mod memory;
pub mod pause;
pub mod registers;
pub mod sound;
pub mod timer;
#[cfg(feature = "frontend")]
pub mod window;

pub use config::{Config, IndexMode};
pub use emulator::{Emulator, Step};
pub use error::{Chip8Error, Result};
pub use machine::Machine;
