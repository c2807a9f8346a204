use crate::memory::TypeAddr;

pub const FLAG: u8 = 0xF;

pub struct Registers {
    registers: [u8; 16],
}

impl Registers {
    pub fn new() -> Self {
        Self { registers: [0; 16] }
    }

    pub fn set_register(&mut self, reg_num: u8, value: u8) {
        self.registers[reg_num as usize] = value;
    }

    /// 7xkk: wraps, VF untouched
    pub fn add_to_register(&mut self, reg_num: u8, value: u8) {
        let reg = &mut self.registers[reg_num as usize];
        *reg = reg.wrapping_add(value);
    }

    pub fn set_flag(&mut self, on: bool) {
        self.set_register(FLAG, on as u8);
    }

    pub fn get(&self, reg_num: u8) -> u8 {
        self.registers[reg_num as usize]
    }

    pub fn all(&self) -> &[u8; 16] {
        &self.registers
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

// Special registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCounter(pub TypeAddr);

impl ProgramCounter {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(2);
    }

    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }
}

/// Only the low 12 bits address anything, but arithmetic on I is plain
/// 16-bit wrapping with no flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRegister(pub TypeAddr);

impl IndexRegister {
    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }

    pub fn advance(&mut self, by: u16) {
        self.0 = self.0.wrapping_add(by);
    }
}
