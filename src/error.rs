use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Chip8Error>;

/// Everything that can stop the machine.
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("failed to read ROM {path:?}: {source}")]
    RomRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("unknown opcode: {opcode:#06X}")]
    UnknownOpcode { opcode: u16 },

    #[error("stack overflow: call with all {depth} return slots in use")]
    StackOverflow { depth: usize },

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("key index {0:#04X} is outside the 16-key pad")]
    InvalidKey(u8),

    #[error("machine was shut down")]
    Shutdown,
}
