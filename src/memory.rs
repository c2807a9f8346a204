use std::fs;
use std::path::Path;

use crate::error::{Chip8Error, Result};
use crate::registers::{IndexRegister, ProgramCounter};

pub type TypeAddr = u16; // in reality u12
type FontBytes = [u8; 5 * 16];

pub const MEMORY_SIZE: usize = 4096;
pub const FONT_START: usize = 0x50;
pub const PROGRAM_START: usize = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START;
pub const STACK_SIZE: usize = 16;

const DEFAULT_FONT: FontBytes = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Address of the built-in glyph for hex digit `digit`.
pub fn glyph_addr(digit: u8) -> TypeAddr {
    digit as TypeAddr * 5 + FONT_START as TypeAddr
}

pub struct Memory {
    // 4k bytes
    // font data stored from 050 -> 09F (000 -> 04F is empty by convention)
    bytes: [u8; MEMORY_SIZE],
    pub pc: ProgramCounter,
    pub index: IndexRegister,
    pub stack: Stack,
}

impl Memory {
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        bytes[FONT_START..FONT_START + DEFAULT_FONT.len()].copy_from_slice(&DEFAULT_FONT);
        Self {
            bytes,
            pc: ProgramCounter(PROGRAM_START as TypeAddr),
            index: IndexRegister(0x0),
            stack: Stack::new(),
        }
    }

    pub fn set(&mut self, addr: usize, val: u8) -> Result<()> {
        let cell = self
            .bytes
            .get_mut(addr)
            .ok_or(Chip8Error::MemoryOutOfBounds { address: addr })?;
        *cell = val;
        Ok(())
    }

    pub fn get(&self, addr: usize) -> Result<u8> {
        self.bytes
            .get(addr)
            .copied()
            .ok_or(Chip8Error::MemoryOutOfBounds { address: addr })
    }

    /// `len` bytes starting at `addr`, e.g. the rows of a sprite
    pub fn slice(&self, addr: usize, len: usize) -> Result<&[u8]> {
        // first address past the end of memory
        self.bytes
            .get(addr..addr + len)
            .ok_or(Chip8Error::MemoryOutOfBounds {
                address: addr.max(MEMORY_SIZE),
            })
    }

    pub fn increment_pc(&mut self) {
        self.pc.increment();
    }

    /// Big-endian word at PC; PC moves past it before anything executes.
    pub fn next_instruction(&mut self) -> Result<u16> {
        let at = self.pc.0 as usize;
        let (l, r) = (self.get(at)?, self.get(at + 1)?);
        self.increment_pc();
        Ok(((l as u16) << 8) | r as u16)
    }

    pub fn set_pc(&mut self, addr: TypeAddr) {
        self.pc.set_addr(addr);
    }

    pub fn set_index(&mut self, addr: TypeAddr) {
        self.index.set_addr(addr);
    }

    /// Copies program bytes verbatim to 0x200. Oversized images are rejected
    /// before anything is written.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: bytes.len(),
                max: MAX_ROM_SIZE,
            });
        }
        self.bytes[PROGRAM_START..PROGRAM_START + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn load_rom_by_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let program = fs::read(path).map_err(|source| Chip8Error::RomRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_rom(&program)
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// Return addresses for 2nnn / 00EE.
///
/// Slot 0 is never written: a call bumps the pointer first and then stores,
/// so at most 15 calls can be outstanding.
#[derive(Debug)]
pub struct Stack {
    addresses: [TypeAddr; STACK_SIZE],
    sp: u8,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            addresses: [0; STACK_SIZE],
            sp: 0,
        }
    }

    pub fn push(&mut self, addr: TypeAddr) -> Result<()> {
        if self.sp as usize >= STACK_SIZE - 1 {
            return Err(Chip8Error::StackOverflow {
                depth: STACK_SIZE - 1,
            });
        }
        self.sp += 1;
        self.addresses[self.sp as usize] = addr;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<TypeAddr> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow);
        }
        let addr = self.addresses[self.sp as usize];
        self.sp -= 1;
        Ok(addr)
    }

    pub fn sp(&self) -> u8 {
        self.sp
    }

    pub fn slots(&self) -> &[TypeAddr; STACK_SIZE] {
        &self.addresses
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}
