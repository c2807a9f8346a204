use std::fmt::Write as _;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Config, IndexMode};
use crate::decode::OpCodes;
use crate::display::Screen;
use crate::error::Result;
use crate::keyboard::Keyboard;
use crate::memory::{glyph_addr, Memory};
use crate::registers::{Registers, FLAG};
use crate::sound::{BeepSink, Mute};
use crate::timer::Timers;

/// Outcome of a single cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The instruction ran to completion.
    Continue,
    /// FX0A found no key yet. Nothing else changed; run the cycle again to
    /// re-check without fetching.
    AwaitingKey,
}

/// The whole machine state plus the fetch/decode/execute loop body.
///
/// Single-threaded on its own; `Machine` shares it with the timer thread.
pub struct Emulator {
    pub fb: Screen,
    pub regs: Registers,
    pub mem: Memory,
    pub timers: Timers,
    pub keyboard: Keyboard,
    sound: Box<dyn BeepSink>,
    rng: StdRng,
    index_mode: IndexMode,
    opcode: u16,
    awaiting_key: Option<u8>,
}

impl Emulator {
    pub fn new(config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            fb: Screen::new(),
            regs: Registers::new(),
            mem: Memory::new(),
            timers: Timers::new(),
            keyboard: Keyboard::new(),
            sound: Box::new(Mute),
            rng,
            index_mode: config.index_mode,
            opcode: 0,
            awaiting_key: None,
        }
    }

    pub fn set_beep_handler(&mut self, sink: impl BeepSink + 'static) {
        self.sound = Box::new(sink);
    }

    pub fn load_rom(&mut self, rom: &[u8]) -> Result<()> {
        self.mem.load_rom(rom)?;
        log::info!("loaded {} byte ROM", rom.len());
        Ok(())
    }

    pub fn load_rom_by_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.mem.load_rom_by_file(path)?;
        log::info!("loaded ROM {}", path.display());
        Ok(())
    }

    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    pub fn is_awaiting_key(&self) -> bool {
        self.awaiting_key.is_some()
    }

    /// Reads the word at PC and moves PC past it. PC stays advanced even
    /// when the word doesn't decode.
    pub fn fetch_decode(&mut self) -> Result<OpCodes> {
        let at = self.mem.pc.0;
        let ins = self.mem.next_instruction()?;
        self.opcode = ins;
        let op = OpCodes::decode_raw(ins)?;
        log::trace!("{at:03X}: {ins:04X} {op:?}");
        Ok(op)
    }

    /// One cycle: fetch, decode, execute. While an FX0A is pending this only
    /// re-checks the keyboard.
    pub fn tick(&mut self) -> Result<Step> {
        let ins = match self.awaiting_key {
            Some(vx) => OpCodes::GetKey(vx),
            None => self.fetch_decode()?,
        };
        self.execute_ins(ins)
    }

    pub fn execute_ins(&mut self, ins: OpCodes) -> Result<Step> {
        match ins {
            OpCodes::ClearScreen => {
                self.fb.clear_buffer();
            }
            OpCodes::PopSubroutine => {
                let addr = self.mem.stack.pop()?;
                self.mem.set_pc(addr);
            }
            OpCodes::Jump(addr) => {
                self.mem.set_pc(addr);
            }
            OpCodes::PushSubroutine(addr) => {
                self.mem.stack.push(self.mem.pc.0)?; // PC already points past the call
                self.mem.set_pc(addr);
            }
            OpCodes::SkipEqualConstant(vx, nn) => {
                if self.regs.get(vx) == nn {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipNotEqualConstant(vx, nn) => {
                if self.regs.get(vx) != nn {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipEqualRegister(vx, vy) => {
                if self.regs.get(vx) == self.regs.get(vy) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipNotEqualRegister(vx, vy) => {
                if self.regs.get(vx) != self.regs.get(vy) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SetRegister(vx, nn) => {
                self.regs.set_register(vx, nn);
            }
            OpCodes::AddToRegister(vx, nn) => {
                self.regs.add_to_register(vx, nn);
            }
            OpCodes::CopyRegister(vx, vy) => {
                self.regs.set_register(vx, self.regs.get(vy));
            }
            OpCodes::Or(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) | self.regs.get(vy));
            }
            OpCodes::And(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) & self.regs.get(vy));
            }
            OpCodes::XOr(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) ^ self.regs.get(vy));
            }
            // flag goes in last so it survives when vx is VF
            OpCodes::Add(vx, vy) => {
                let (z, carry) = self.regs.get(vx).overflowing_add(self.regs.get(vy));
                self.regs.set_register(vx, z);
                self.regs.set_flag(carry);
            }
            // strictly greater: equal operands leave VF = 0
            OpCodes::SubtractForward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_register(vx, x.wrapping_sub(y));
                self.regs.set_flag(x > y);
            }
            OpCodes::SubtractBackward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_register(vx, y.wrapping_sub(x));
                self.regs.set_flag(y > x);
            }
            OpCodes::RightShift(vx, _) => {
                let vx_value = self.regs.get(vx);
                self.regs.set_register(vx, vx_value >> 1);
                self.regs.set_register(FLAG, vx_value & 1);
            }
            OpCodes::LeftShift(vx, _) => {
                let vx_value = self.regs.get(vx);
                self.regs.set_register(vx, vx_value << 1);
                self.regs.set_register(FLAG, (vx_value >> 7) & 1);
            }
            OpCodes::SetIndexRegister(addr) => self.mem.set_index(addr),
            OpCodes::JumpWithOffset(addr) => {
                self.mem
                    .set_pc(addr.wrapping_add(self.regs.get(0) as u16));
            }
            OpCodes::Random(vx, nn) => {
                let ransuu: u8 = self.rng.gen();
                self.regs.set_register(vx, nn & ransuu);
            }
            OpCodes::Display(reg_x, reg_y, height) => {
                let (x, y) = (self.regs.get(reg_x), self.regs.get(reg_y));
                // rows I..I+N, one byte (8 pixels) each
                let sprite = self.mem.slice(self.mem.index.0 as usize, height as usize)?;
                let collision = self.fb.paint(x, y, sprite);
                self.regs.set_flag(collision);
            }
            OpCodes::SkipIfPressed(vx) => {
                if self.keyboard.get_key_status_from_num(self.regs.get(vx))? {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipIfNotPressed(vx) => {
                if !self.keyboard.get_key_status_from_num(self.regs.get(vx))? {
                    self.mem.increment_pc();
                }
            }
            OpCodes::CopyDelayToRegister(vx) => self.regs.set_register(vx, self.timers.delay),
            OpCodes::GetKey(vx) => match self.keyboard.take_last_key() {
                Some(key) => {
                    if self.awaiting_key.take().is_some() {
                        log::debug!("got keypress {key:X}");
                    }
                    self.regs.set_register(vx, key);
                }
                None => {
                    if self.awaiting_key.replace(vx).is_none() {
                        log::debug!("waiting for keypress into V{vx:X}");
                    }
                    return Ok(Step::AwaitingKey);
                }
            },
            OpCodes::CopyRegisterToDelay(vx) => self.timers.delay = self.regs.get(vx),
            OpCodes::CopyRegisterToSound(vx) => {
                self.timers.sound = self.regs.get(vx);
                if self.timers.sound > 0 {
                    log::debug!("beep on for {} ticks", self.timers.sound);
                    self.sound.beep(true);
                }
            }
            OpCodes::AddToIndex(vx) => {
                // no VF on overflow past 0xFFF
                self.mem.index.advance(self.regs.get(vx) as u16);
            }
            OpCodes::PointChar(vx) => {
                self.mem.set_index(glyph_addr(self.regs.get(vx)));
            }
            OpCodes::ToDecimal(vx) => {
                let value = self.regs.get(vx);
                let at = self.mem.index.0 as usize;
                self.mem.set(at, value / 100)?;
                self.mem.set(at + 1, (value / 10) % 10)?;
                self.mem.set(at + 2, value % 10)?;
            }
            OpCodes::StoreRegisterToMemory(vx) => {
                let at = self.mem.index.0 as usize;
                for reg in 0..=vx {
                    self.mem.set(at + reg as usize, self.regs.get(reg))?;
                }
                self.advance_index_after_transfer(vx);
            }
            OpCodes::LoadRegisterFromMemory(vx) => {
                let at = self.mem.index.0 as usize;
                for reg in 0..=vx {
                    let reg_val = self.mem.get(at + reg as usize)?;
                    self.regs.set_register(reg, reg_val);
                }
                self.advance_index_after_transfer(vx);
            }
        }
        Ok(Step::Continue)
    }

    fn advance_index_after_transfer(&mut self, vx: u8) {
        if self.index_mode == IndexMode::Legacy {
            self.mem.index.advance(vx as u16 + 1);
        }
    }

    /// One 60 Hz timer step.
    pub fn sync_timers(&mut self) {
        if self.timers.tick() {
            log::debug!("beep off");
            self.sound.beep(false);
        }
    }

    pub fn key_down(&mut self, key: u8) -> Result<()> {
        self.keyboard.key_down(key)
    }

    pub fn key_up(&mut self, key: u8) -> Result<()> {
        self.keyboard.key_up(key)
    }

    /// Human-readable register dump.
    pub fn inspect(&self) -> String {
        let mut state = String::new();
        // writing into a String can't fail
        let _ = writeln!(state, "Opcode: {:#06X}", self.opcode);
        let _ = writeln!(state, "V     : {:02X?}", self.regs.all());
        let _ = writeln!(state, "Stack : {:03X?}", self.mem.stack.slots());
        let _ = writeln!(state, "SP    : {}", self.mem.stack.sp());
        let _ = writeln!(state, "I     : {:#05X}", self.mem.index.0);
        let _ = writeln!(state, "PC    : {:#05X}", self.mem.pc.0);
        let _ = writeln!(state, "ST    : {}", self.timers.sound);
        let _ = writeln!(state, "DT    : {}", self.timers.delay);
        state
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Chip8Error;
    use crate::memory::FONT_START;
    use std::sync::{Arc, Mutex};

    fn emulator_with(program: &[u8]) -> Emulator {
        let mut emu = Emulator::new(&Config::default().with_seed(7));
        emu.load_rom(program).unwrap();
        emu
    }

    fn run(emu: &mut Emulator, op: u16) -> Result<Step> {
        emu.execute_ins(OpCodes::decode_raw(op)?)
    }

    fn lit(emu: &Emulator) -> usize {
        emu.fb.frame().iter().flatten().filter(|&&p| p == 1).count()
    }

    #[test]
    fn test_two_cycle_program() {
        let mut emu = emulator_with(&[0x60, 0x05, 0x70, 0x03]);
        emu.tick().unwrap();
        emu.tick().unwrap();
        assert_eq!(emu.regs.get(0), 8);
        assert_eq!(emu.mem.pc.0, 0x204);
        assert_eq!(emu.opcode(), 0x7003);
    }

    #[test]
    fn test_unknown_opcode_keeps_pc_advanced() {
        let mut emu = emulator_with(&[0x80, 0x08]);
        match emu.tick() {
            Err(Chip8Error::UnknownOpcode { opcode }) => assert_eq!(opcode, 0x8008),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(emu.mem.pc.0, 0x202);
    }

    #[test]
    fn test_00e0_cls() {
        let mut emu = emulator_with(&[]);
        emu.fb.paint(0, 0, &[0xFF, 0xFF]);
        emu.fb.clear_redraw();
        run(&mut emu, 0x00E0).unwrap();
        assert_eq!(lit(&emu), 0);
        assert!(emu.fb.needs_redraw());
    }

    #[test]
    fn test_call_and_return() {
        // 200: call 300 / 300: return
        let mut emu = emulator_with(&[0x23, 0x00]);
        emu.mem.set(0x300, 0x00).unwrap();
        emu.mem.set(0x301, 0xEE).unwrap();
        emu.tick().unwrap();
        assert_eq!(emu.mem.pc.0, 0x300);
        assert_eq!(emu.mem.stack.sp(), 1);
        assert_eq!(emu.mem.stack.slots()[1], 0x202);
        emu.tick().unwrap();
        assert_eq!(emu.mem.pc.0, 0x202);
        assert_eq!(emu.mem.stack.sp(), 0);
    }

    #[test]
    fn test_return_on_empty_stack_fails() {
        let mut emu = emulator_with(&[0x00, 0xEE]);
        assert!(matches!(emu.tick(), Err(Chip8Error::StackUnderflow)));
    }

    #[test]
    fn test_runaway_recursion_fails() {
        // 200: call 200
        let mut emu = emulator_with(&[0x22, 0x00]);
        for _ in 0..15 {
            emu.tick().unwrap();
        }
        assert!(matches!(
            emu.tick(),
            Err(Chip8Error::StackOverflow { depth: 15 })
        ));
    }

    #[test]
    fn test_jumps() {
        let mut emu = emulator_with(&[]);
        run(&mut emu, 0x1ABC).unwrap();
        assert_eq!(emu.mem.pc.0, 0xABC);
        emu.regs.set_register(0, 0x10);
        run(&mut emu, 0xB300).unwrap();
        assert_eq!(emu.mem.pc.0, 0x310);
    }

    #[test]
    fn test_skips() {
        let mut emu = emulator_with(&[]);
        emu.regs.set_register(0x1, 0x11);
        emu.regs.set_register(0x2, 0x11);

        let cases = [
            (0x3111, true),
            (0x3112, false),
            (0x4111, false),
            (0x4112, true),
            (0x5120, true),
            (0x5130, false),
            (0x9120, false),
            (0x9130, true),
        ];
        for (op, skips) in cases {
            emu.mem.set_pc(0x200);
            run(&mut emu, op).unwrap();
            let expected = if skips { 0x202 } else { 0x200 };
            assert_eq!(emu.mem.pc.0, expected, "{op:04X}");
        }
    }

    #[test]
    fn test_load_and_add_immediate() {
        let mut emu = emulator_with(&[]);
        run(&mut emu, 0x61FE).unwrap();
        run(&mut emu, 0x7103).unwrap();
        assert_eq!(emu.regs.get(0x1), 0x01);
        assert_eq!(emu.regs.get(FLAG), 0);
    }

    #[test]
    fn test_bitwise_leave_vf_alone() {
        let mut emu = emulator_with(&[]);
        emu.regs.set_register(FLAG, 0x42);
        emu.regs.set_register(0x1, 0x6);
        emu.regs.set_register(0x2, 0x3);
        run(&mut emu, 0x8121).unwrap();
        assert_eq!(emu.regs.get(0x1), 0x7);
        run(&mut emu, 0x8122).unwrap();
        assert_eq!(emu.regs.get(0x1), 0x3);
        run(&mut emu, 0x8123).unwrap();
        assert_eq!(emu.regs.get(0x1), 0x0);
        run(&mut emu, 0x8120).unwrap();
        assert_eq!(emu.regs.get(0x1), 0x3);
        assert_eq!(emu.regs.get(FLAG), 0x42);
    }

    #[test]
    fn test_add_with_carry() {
        let mut emu = emulator_with(&[]);
        emu.regs.set_register(0x1, 0xFF);
        emu.regs.set_register(0x2, 0x01);
        run(&mut emu, 0x8124).unwrap();
        assert_eq!(emu.regs.get(0x1), 0x00);
        assert_eq!(emu.regs.get(FLAG), 1);

        emu.regs.set_register(0x1, 0x10);
        run(&mut emu, 0x8124).unwrap();
        assert_eq!(emu.regs.get(0x1), 0x11);
        assert_eq!(emu.regs.get(FLAG), 0);
    }

    #[test]
    fn test_sub_with_borrow() {
        let mut emu = emulator_with(&[]);
        emu.regs.set_register(0x1, 0x01);
        emu.regs.set_register(0x2, 0x02);
        run(&mut emu, 0x8125).unwrap();
        assert_eq!(emu.regs.get(0x1), 0xFF);
        assert_eq!(emu.regs.get(FLAG), 0);

        emu.regs.set_register(0x1, 0x05);
        run(&mut emu, 0x8125).unwrap();
        assert_eq!(emu.regs.get(0x1), 0x03);
        assert_eq!(emu.regs.get(FLAG), 1);

        emu.regs.set_register(0x1, 0x02);
        run(&mut emu, 0x8125).unwrap();
        assert_eq!(emu.regs.get(0x1), 0x00);
        assert_eq!(emu.regs.get(FLAG), 0);
    }

    #[test]
    fn test_subn() {
        let mut emu = emulator_with(&[]);
        emu.regs.set_register(0x1, 0x02);
        emu.regs.set_register(0x2, 0x05);
        run(&mut emu, 0x8127).unwrap();
        assert_eq!(emu.regs.get(0x1), 0x03);
        assert_eq!(emu.regs.get(FLAG), 1);

        emu.regs.set_register(0x1, 0x06);
        run(&mut emu, 0x8127).unwrap();
        assert_eq!(emu.regs.get(0x1), 0xFF);
        assert_eq!(emu.regs.get(FLAG), 0);

        emu.regs.set_register(0x1, 0x05);
        run(&mut emu, 0x8127).unwrap();
        assert_eq!(emu.regs.get(0x1), 0x00);
        assert_eq!(emu.regs.get(FLAG), 0);
    }

    #[test]
    fn test_shifts() {
        let mut emu = emulator_with(&[]);
        emu.regs.set_register(0x1, 0b1000_0011);
        run(&mut emu, 0x8106).unwrap();
        assert_eq!(emu.regs.get(0x1), 0b0100_0001);
        assert_eq!(emu.regs.get(FLAG), 1);

        emu.regs.set_register(0x1, 0b1000_0010);
        run(&mut emu, 0x810E).unwrap();
        assert_eq!(emu.regs.get(0x1), 0b0000_0100);
        assert_eq!(emu.regs.get(FLAG), 1);

        run(&mut emu, 0x810E).unwrap();
        assert_eq!(emu.regs.get(FLAG), 0);
    }

    #[test]
    fn test_flag_wins_when_vx_is_vf() {
        let mut emu = emulator_with(&[]);
        emu.regs.set_register(FLAG, 0xFF);
        emu.regs.set_register(0x1, 0x01);
        run(&mut emu, 0x8F14).unwrap();
        assert_eq!(emu.regs.get(FLAG), 1);

        emu.regs.set_register(FLAG, 0x05);
        emu.regs.set_register(0x1, 0x03);
        run(&mut emu, 0x8F15).unwrap();
        assert_eq!(emu.regs.get(FLAG), 1);
    }

    #[test]
    fn test_random_is_masked() {
        let mut emu = emulator_with(&[]);
        for _ in 0..32 {
            run(&mut emu, 0xC10F).unwrap();
            assert_eq!(emu.regs.get(0x1) & 0xF0, 0);
        }
        run(&mut emu, 0xC100).unwrap();
        assert_eq!(emu.regs.get(0x1), 0);
    }

    #[test]
    fn test_random_is_seeded() {
        let mut a = emulator_with(&[]);
        let mut b = emulator_with(&[]);
        for _ in 0..8 {
            run(&mut a, 0xC1FF).unwrap();
            run(&mut b, 0xC1FF).unwrap();
            assert_eq!(a.regs.get(0x1), b.regs.get(0x1));
        }
    }

    #[test]
    fn test_draw_collision() {
        let mut emu = emulator_with(&[]);
        emu.mem.set(0x300, 0b1100_0000).unwrap();
        emu.mem.set_index(0x300);
        emu.regs.set_register(0x1, 10);
        emu.regs.set_register(0x2, 4);

        run(&mut emu, 0xD121).unwrap();
        assert_eq!(emu.regs.get(FLAG), 0);
        assert_eq!(emu.fb.pixel(10, 4), 1);
        assert_eq!(emu.fb.pixel(11, 4), 1);

        run(&mut emu, 0xD121).unwrap();
        assert_eq!(emu.regs.get(FLAG), 1);
        assert_eq!(lit(&emu), 0);
    }

    #[test]
    fn test_draw_font_glyph_wraps() {
        let mut emu = emulator_with(&[]);
        emu.regs.set_register(0x0, 0x0);
        emu.regs.set_register(0x1, 62);
        emu.regs.set_register(0x2, 30);
        run(&mut emu, 0xF029).unwrap();
        assert_eq!(emu.mem.index.0, FONT_START as u16);
        run(&mut emu, 0xD125).unwrap();
        // "0" is F0 90 90 90 F0: top row fully lit, wraps to x = 0..1
        assert_eq!(emu.fb.pixel(62, 30), 1);
        assert_eq!(emu.fb.pixel(1, 30), 1);
        assert_eq!(emu.fb.pixel(2, 30), 0);
        // third row lands on y = 0
        assert_eq!(emu.fb.pixel(62, 0), 1);
        assert_eq!(emu.fb.pixel(1, 0), 1);
        assert_eq!(emu.fb.pixel(63, 0), 0);
        assert!(emu.fb.needs_redraw());
    }

    #[test]
    fn test_draw_sprite_past_memory_fails() {
        let mut emu = emulator_with(&[]);
        emu.mem.set_index(0xFFE);
        assert!(matches!(
            run(&mut emu, 0xD005),
            Err(Chip8Error::MemoryOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_key_skips() {
        let mut emu = emulator_with(&[]);
        emu.regs.set_register(0x3, 0xA);
        emu.key_down(0xA).unwrap();

        emu.mem.set_pc(0x200);
        run(&mut emu, 0xE39E).unwrap();
        assert_eq!(emu.mem.pc.0, 0x202);
        emu.mem.set_pc(0x200);
        run(&mut emu, 0xE3A1).unwrap();
        assert_eq!(emu.mem.pc.0, 0x200);

        emu.key_up(0xA).unwrap();
        emu.mem.set_pc(0x200);
        run(&mut emu, 0xE39E).unwrap();
        assert_eq!(emu.mem.pc.0, 0x200);
        run(&mut emu, 0xE3A1).unwrap();
        assert_eq!(emu.mem.pc.0, 0x202);
    }

    #[test]
    fn test_key_skip_on_invalid_key() {
        let mut emu = emulator_with(&[]);
        emu.regs.set_register(0x3, 0x10);
        assert!(matches!(
            run(&mut emu, 0xE39E),
            Err(Chip8Error::InvalidKey(0x10))
        ));
    }

    #[test]
    fn test_get_key_waits_then_latches() {
        let mut emu = emulator_with(&[0xF5, 0x0A, 0x61, 0x01]);
        assert_eq!(emu.tick().unwrap(), Step::AwaitingKey);
        assert!(emu.is_awaiting_key());
        assert_eq!(emu.tick().unwrap(), Step::AwaitingKey);
        assert_eq!(emu.mem.pc.0, 0x202);

        emu.key_down(0xC).unwrap();
        assert_eq!(emu.tick().unwrap(), Step::Continue);
        assert_eq!(emu.regs.get(0x5), 0xC);
        assert!(!emu.is_awaiting_key());
        // latch was consumed; next cycle fetches 6101
        emu.tick().unwrap();
        assert_eq!(emu.regs.get(0x1), 0x01);
        assert_eq!(emu.mem.pc.0, 0x204);
    }

    #[test]
    fn test_timer_registers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let mut emu = emulator_with(&[]);
        emu.set_beep_handler(move |on: bool| recorded.lock().unwrap().push(on));

        emu.regs.set_register(0x1, 3);
        run(&mut emu, 0xF115).unwrap();
        run(&mut emu, 0xF118).unwrap();
        assert_eq!(emu.timers.delay, 3);
        assert_eq!(emu.timers.sound, 3);
        run(&mut emu, 0xF207).unwrap();
        assert_eq!(emu.regs.get(0x2), 3);

        for _ in 0..5 {
            emu.sync_timers();
        }
        assert_eq!(emu.timers, Timers { delay: 0, sound: 0 });
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);

        // loading zero doesn't start a beep
        emu.regs.set_register(0x1, 0);
        run(&mut emu, 0xF118).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_add_to_index_has_no_flag() {
        let mut emu = emulator_with(&[]);
        emu.mem.set_index(0xFFF);
        emu.regs.set_register(0x1, 0x02);
        emu.regs.set_register(FLAG, 0x5);
        run(&mut emu, 0xF11E).unwrap();
        assert_eq!(emu.mem.index.0, 0x1001);
        assert_eq!(emu.regs.get(FLAG), 0x5);
    }

    #[test]
    fn test_point_char() {
        let mut emu = emulator_with(&[]);
        emu.regs.set_register(0x1, 0xF);
        run(&mut emu, 0xF129).unwrap();
        assert_eq!(emu.mem.index.0, 0x50 + 0xF * 5);
    }

    #[test]
    fn test_bcd() {
        let mut emu = emulator_with(&[]);
        emu.mem.set_index(0x300);
        for (value, digits) in [(254u8, [2, 5, 4]), (7, [0, 0, 7]), (90, [0, 9, 0])] {
            emu.regs.set_register(0x1, value);
            run(&mut emu, 0xF133).unwrap();
            assert_eq!(emu.mem.slice(0x300, 3).unwrap(), &digits);
        }
        assert_eq!(emu.mem.index.0, 0x300);
    }

    fn store_load_round_trip(mode: IndexMode) -> Emulator {
        let mut emu = Emulator::new(&Config::default().with_index_mode(mode));
        for reg in 0..=4 {
            emu.regs.set_register(reg, 0x10 + reg);
        }
        emu.mem.set_index(0x400);
        run(&mut emu, 0xF455).unwrap();
        assert_eq!(emu.mem.slice(0x400, 5).unwrap(), &[0x10, 0x11, 0x12, 0x13, 0x14]);
        assert_eq!(emu.mem.get(0x405).unwrap(), 0);

        for reg in 0..=4 {
            emu.regs.set_register(reg, 0);
        }
        emu.mem.set_index(0x400);
        run(&mut emu, 0xF465).unwrap();
        for reg in 0..=4 {
            assert_eq!(emu.regs.get(reg), 0x10 + reg);
        }
        assert_eq!(emu.regs.get(0x5), 0);
        emu
    }

    #[test]
    fn test_store_load_unmodified_index() {
        let emu = store_load_round_trip(IndexMode::Unmodified);
        assert_eq!(emu.mem.index.0, 0x400);
    }

    #[test]
    fn test_store_load_legacy_index() {
        let emu = store_load_round_trip(IndexMode::Legacy);
        assert_eq!(emu.mem.index.0, 0x405);
    }

    #[test]
    fn test_inspect() {
        let mut emu = emulator_with(&[0x60, 0x05]);
        emu.tick().unwrap();
        let dump = emu.inspect();
        assert!(dump.contains("Opcode: 0x6005"), "{dump}");
        assert!(dump.contains("PC    : 0x202"), "{dump}");
        assert!(dump.contains("SP    : 0"), "{dump}");
        assert!(dump.contains("V     : [05, 00,"), "{dump}");
        assert_eq!(dump.lines().count(), 8);
    }
}
