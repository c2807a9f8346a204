use crate::error::{Chip8Error, Result};

pub const KEY_COUNT: usize = 16;

/// Hex keypad state as seen by the interpreter.
///
/// ```text
/// |1|2|3|C|
/// |4|5|6|D|
/// |7|8|9|E|
/// |A|0|B|F|
/// ```
///
/// `last_key` remembers the most recent key-down and is consumed by FX0A.
pub struct Keyboard {
    keys: [bool; KEY_COUNT],
    last_key: Option<u8>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            keys: [false; KEY_COUNT],
            last_key: None,
        }
    }

    pub fn key_down(&mut self, key: u8) -> Result<()> {
        *self.slot(key)? = true;
        self.last_key = Some(key);
        Ok(())
    }

    pub fn key_up(&mut self, key: u8) -> Result<()> {
        *self.slot(key)? = false;
        Ok(())
    }

    pub fn get_key_status_from_num(&self, n: u8) -> Result<bool> {
        self.keys
            .get(n as usize)
            .copied()
            .ok_or(Chip8Error::InvalidKey(n))
    }

    pub fn take_last_key(&mut self) -> Option<u8> {
        self.last_key.take()
    }

    fn slot(&mut self, key: u8) -> Result<&mut bool> {
        self.keys
            .get_mut(key as usize)
            .ok_or(Chip8Error::InvalidKey(key))
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}
