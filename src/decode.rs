use crate::error::{Chip8Error, Result};
use crate::memory::TypeAddr;

/// A fetched instruction word split into its operand fields.
///
/// ```text
/// 0110 1100 1111 0001
///      x--- y--- n---
///      nnn-----------
///           kk-------
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInstruction {
    code: u16,
}

impl RawInstruction {
    pub fn new(code: u16) -> Self {
        RawInstruction { code }
    }

    // n is starting digit, m is length
    pub fn nth_m_digits(&self, n: u8, m: u8) -> u16 {
        let shift_places = (4 - m - (n - 1)) * 4;
        let mask = (1u32 << (m * 4)) - 1;
        (self.code >> shift_places) & mask as u16
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn identifier(&self) -> u8 {
        self.nth_m_digits(1, 1) as u8
    }

    pub fn x(&self) -> u8 {
        self.nth_m_digits(2, 1) as u8
    }

    pub fn y(&self) -> u8 {
        self.nth_m_digits(3, 1) as u8
    }

    pub fn n(&self) -> u8 {
        self.nth_m_digits(4, 1) as u8
    }

    pub fn kk(&self) -> u8 {
        self.nth_m_digits(3, 2) as u8
    }

    pub fn nnn(&self) -> TypeAddr {
        self.nth_m_digits(2, 3)
    }
}

impl PartialEq<u16> for RawInstruction {
    fn eq(&self, ins: &u16) -> bool {
        ins.eq(&self.code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCodes {
    // 00E0
    // turn all pixels to 0
    ClearScreen,
    // 00EE
    PopSubroutine,
    // 1NNN
    // set PC to address NNN, "jump" to memory location
    Jump(TypeAddr),
    // 2NNN
    PushSubroutine(TypeAddr),

    // 3XNN
    SkipEqualConstant(u8, u8),
    // 4XNN
    SkipNotEqualConstant(u8, u8),
    // 5XY0
    SkipEqualRegister(u8, u8),
    // 9XY0
    SkipNotEqualRegister(u8, u8),

    // 6XNN
    // set register VX to value NN
    SetRegister(u8, u8),
    // 7XNN
    // add value NN to VX, no carry
    AddToRegister(u8, u8),

    // 8XY0
    CopyRegister(u8, u8),
    // 8XY1
    Or(u8, u8),
    // 8XY2
    And(u8, u8),
    // 8XY3
    XOr(u8, u8),
    /// 8XY4, VF = carry
    Add(u8, u8),
    /// 8XY5, VX = VX - VY, VF = not borrow
    SubtractForward(u8, u8),
    /// 8XY6, VF = dropped bit
    RightShift(u8, u8),
    /// 8XY7, VX = VY - VX, VF = not borrow
    SubtractBackward(u8, u8),
    /// 8XYE, VF = dropped bit
    LeftShift(u8, u8),

    // ANNN
    // set index register I to address NNN
    SetIndexRegister(TypeAddr),
    // BNNN
    JumpWithOffset(TypeAddr),
    // CXNN
    Random(u8, u8),
    // DXYN
    // draw an N pixel tall sprite starting at I
    // at Coordinates (VX, VY), wrapping at the screen edges
    // XOR pixels on screen using sprite data
    // if a lit pixel is hit: VF set to 1
    Display(u8, u8, u8),

    // EX9E
    SkipIfPressed(u8),
    // EXA1
    SkipIfNotPressed(u8),

    // FX07
    CopyDelayToRegister(u8),
    // FX0A
    GetKey(u8),
    // FX15
    CopyRegisterToDelay(u8),
    // FX18
    CopyRegisterToSound(u8),
    // FX1E
    AddToIndex(u8),
    // FX29
    PointChar(u8),
    // FX33
    ToDecimal(u8),
    // FX55
    StoreRegisterToMemory(u8),
    // FX65
    LoadRegisterFromMemory(u8),
}

impl OpCodes {
    pub fn decode_raw(ins: u16) -> Result<Self> {
        Self::decode(RawInstruction::new(ins)).ok_or(Chip8Error::UnknownOpcode { opcode: ins })
    }

    fn decode(raw: RawInstruction) -> Option<Self> {
        let (x, y, n, kk, nnn) = (raw.x(), raw.y(), raw.n(), raw.kk(), raw.nnn());

        let op = match raw.identifier() {
            0x0 => match raw.code() {
                0x00E0 => Self::ClearScreen,
                0x00EE => Self::PopSubroutine,
                _ => return None,
            },
            0x1 => Self::Jump(nnn),
            0x2 => Self::PushSubroutine(nnn),
            0x3 => Self::SkipEqualConstant(x, kk),
            0x4 => Self::SkipNotEqualConstant(x, kk),
            0x5 if n == 0x0 => Self::SkipEqualRegister(x, y),
            0x6 => Self::SetRegister(x, kk),
            0x7 => Self::AddToRegister(x, kk),
            0x8 => match n {
                0x0 => Self::CopyRegister(x, y),
                0x1 => Self::Or(x, y),
                0x2 => Self::And(x, y),
                0x3 => Self::XOr(x, y),
                0x4 => Self::Add(x, y),
                0x5 => Self::SubtractForward(x, y),
                0x6 => Self::RightShift(x, y),
                0x7 => Self::SubtractBackward(x, y),
                0xE => Self::LeftShift(x, y),
                _ => return None,
            },
            0x9 if n == 0x0 => Self::SkipNotEqualRegister(x, y),
            0xA => Self::SetIndexRegister(nnn),
            0xB => Self::JumpWithOffset(nnn),
            0xC => Self::Random(x, kk),
            0xD => Self::Display(x, y, n),
            0xE => match kk {
                0x9E => Self::SkipIfPressed(x),
                0xA1 => Self::SkipIfNotPressed(x),
                _ => return None,
            },
            0xF => match kk {
                0x07 => Self::CopyDelayToRegister(x),
                0x0A => Self::GetKey(x),
                0x15 => Self::CopyRegisterToDelay(x),
                0x18 => Self::CopyRegisterToSound(x),
                0x1E => Self::AddToIndex(x),
                0x29 => Self::PointChar(x),
                0x33 => Self::ToDecimal(x),
                0x55 => Self::StoreRegisterToMemory(x),
                0x65 => Self::LoadRegisterFromMemory(x),
                _ => return None,
            },
            _ => return None,
        };
        Some(op)
    }
}
