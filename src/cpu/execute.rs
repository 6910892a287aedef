//! Execution engine.
//!
//! Implements the fetch-decode-dispatch-execute cycle and every
//! instruction handler. Handlers check bounds before touching state, so
//! a failed step leaves the machine exactly as it was before the fetch.

use crate::config::{Config, ShiftFlag, SpriteRows};
use crate::cpu::decode::{self, Instruction};
use crate::cpu::dispatch::dispatch;
use crate::cpu::memory::{Memory, MemoryError, MEMORY_SIZE, PROGRAM_START};
use crate::cpu::peripherals::{Keypad, Timers, KEY_COUNT};
use crate::cpu::registers::{Registers, StackError};
use crate::display::{self, font, Framebuffer};
use crate::random::{RandomSource, ThreadRandom};
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is running normally.
    Running,
    /// A step failed; the machine must be reset before it runs again.
    Error,
}

/// Outcome of a single successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The instruction ran and the PC moved on.
    Executed(Instruction),
    /// `FX0A` found no key held. Nothing changed; the same instruction
    /// runs again on the next step.
    WaitingForKey(Instruction),
}

/// What a handler did with the program counter.
enum Flow {
    Continue,
    Blocked,
}

/// The interpreter: memory, registers, timers, keypad and display.
pub struct Cpu {
    /// Registers and return stack.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// The display.
    pub display: Framebuffer,
    /// Delay and sound timers.
    pub timers: Timers,
    /// Hex keypad.
    pub keypad: Keypad,
    /// Current execution state.
    pub state: CpuState,
    /// Instructions executed since power-on or reset.
    pub cycles: u64,
    config: Config,
    random: Box<dyn RandomSource>,
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a CPU with default configuration and a thread-local random source.
    pub fn new() -> Self {
        Self::with_options(Config::default(), None)
    }

    /// Create a CPU with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self::with_options(config, None)
    }

    /// Create a CPU with the given configuration and random source.
    ///
    /// `None` selects a uniform thread-local generator.
    pub fn with_options(config: Config, random: Option<Box<dyn RandomSource>>) -> Self {
        let mut cpu = Self {
            regs: Registers::new(),
            mem: Memory::new(),
            display: Framebuffer::new(),
            timers: Timers::default(),
            keypad: Keypad::new(),
            state: CpuState::Running,
            cycles: 0,
            config,
            random: random.unwrap_or_else(|| Box::new(ThreadRandom)),
            last_instr: None,
        };
        cpu.power_on();
        cpu
    }

    /// Bring memory to its power-on contents: zeroed, font loaded.
    fn power_on(&mut self) {
        self.mem.clear();
        font::load_font(&mut self.mem);
    }

    /// Reset every component to power-on state.
    ///
    /// Program memory is cleared; call [`Cpu::load_program`] again.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.power_on();
        self.display.clear();
        self.timers = Timers::default();
        self.keypad.release_all();
        self.state = CpuState::Running;
        self.cycles = 0;
        self.last_instr = None;
        debug!("machine reset");
    }

    /// Load a program image at 0x200.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), CpuError> {
        self.mem.load_program(PROGRAM_START as usize, program)?;
        debug!("loaded {} program bytes at {:#05X}", program.len(), PROGRAM_START);
        Ok(())
    }

    /// The active configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Fetch the word at PC.
    fn fetch(&self) -> Result<u16, CpuError> {
        Ok(self.mem.read_word(self.regs.pc as usize)?)
    }

    /// Execute a single instruction.
    ///
    /// Any error halts the CPU (state becomes [`CpuState::Error`]) and
    /// leaves registers, memory and display untouched.
    pub fn step(&mut self) -> Result<Step, CpuError> {
        if self.state != CpuState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        match self.try_step() {
            Ok(step) => Ok(step),
            Err(e) => {
                warn!("halting at PC={:#05X}: {}", self.regs.pc, e);
                self.state = CpuState::Error;
                Err(e)
            }
        }
    }

    fn try_step(&mut self) -> Result<Step, CpuError> {
        let pc = self.regs.pc;

        // Fetch
        let raw = self.fetch()?;

        // Decode
        let op = decode::decode(raw);
        let instr = dispatch(&op).ok_or(CpuError::UnknownOpcode { opcode: raw, pc })?;
        trace!("{:#05X}: {:04X} {:?}", pc, raw, instr);

        // Execute
        match self.execute(instr)? {
            Flow::Continue => {
                self.cycles += 1;
                self.last_instr = Some(instr);
                Ok(Step::Executed(instr))
            }
            Flow::Blocked => Ok(Step::WaitingForKey(instr)),
        }
    }

    /// Step until an error, a key wait, or `max_cycles` executed instructions.
    ///
    /// Returns the number of instructions executed.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        let limit = self.cycles.saturating_add(max_cycles);

        while self.cycles < limit {
            if let Step::WaitingForKey(_) = self.step()? {
                break;
            }
        }

        Ok(self.cycles - start_cycles)
    }

    /// Execute a dispatched instruction.
    fn execute(&mut self, instr: Instruction) -> Result<Flow, CpuError> {
        match instr {
            // ==================== Flow ====================
            Instruction::Clear => {
                self.display.clear();
                self.regs.advance_pc();
            }

            Instruction::Return => {
                let addr = self.regs.stack.pop()?;
                self.regs.jump(addr);
            }

            Instruction::Jump { nnn } => {
                self.regs.jump(nnn);
            }

            Instruction::Call { nnn } => {
                let pc = self.regs.pc;
                self.regs.stack.push(pc)?;
                self.regs.jump(nnn);
            }

            Instruction::SkipIfEqual { x, nn } => {
                let vx = self.v(x);
                self.regs.skip_if(vx == nn);
            }

            Instruction::SkipIfNotEqual { x, nn } => {
                let vx = self.v(x);
                self.regs.skip_if(vx != nn);
            }

            Instruction::SkipIfRegistersEqual { x, y } => {
                let equal = self.v(x) == self.v(y);
                self.regs.skip_if(equal);
            }

            Instruction::SkipIfRegistersNotEqual { x, y } => {
                let differ = self.v(x) != self.v(y);
                self.regs.skip_if(differ);
            }

            Instruction::JumpPlusBase { nnn } => {
                let target = self.v(0) as u16 + nnn;
                // The target must hold a whole instruction word.
                if target as usize + 2 > MEMORY_SIZE {
                    return Err(MemoryError::AddressOutOfRange { addr: target as usize, len: 2 }.into());
                }
                self.regs.jump(target);
            }

            // ==================== Registers ====================
            Instruction::SetImmediate { x, nn } => {
                self.set_v(x, nn);
                self.regs.advance_pc();
            }

            Instruction::AddImmediate { x, nn } => {
                let sum = self.v(x).wrapping_add(nn);
                self.set_v(x, sum);
                self.regs.advance_pc();
            }

            Instruction::SetFromRegister { x, y } => {
                let vy = self.v(y);
                self.set_v(x, vy);
                self.regs.advance_pc();
            }

            Instruction::Or { x, y } => {
                let value = self.v(x) | self.v(y);
                self.set_v(x, value);
                self.regs.advance_pc();
            }

            Instruction::And { x, y } => {
                let value = self.v(x) & self.v(y);
                self.set_v(x, value);
                self.regs.advance_pc();
            }

            Instruction::Xor { x, y } => {
                let value = self.v(x) ^ self.v(y);
                self.set_v(x, value);
                self.regs.advance_pc();
            }

            // Flag writes come last so that VF as an operand sees the
            // pre-instruction value and VF as destination ends as the flag.
            Instruction::AddRegisters { x, y } => {
                let (sum, carry) = self.v(x).overflowing_add(self.v(y));
                self.set_v(x, sum);
                self.regs.set_flag(carry as u8);
                self.regs.advance_pc();
            }

            Instruction::SubRegisters { x, y } => {
                let (diff, borrow) = self.v(x).overflowing_sub(self.v(y));
                self.set_v(x, diff);
                self.regs.set_flag(borrow as u8);
                self.regs.advance_pc();
            }

            Instruction::ShiftRight { x, .. } => {
                let vx = self.v(x);
                self.set_v(x, vx >> 1);
                self.regs.set_flag(vx & 0x01);
                self.regs.advance_pc();
            }

            Instruction::ReverseSub { x, y } => {
                let (diff, borrow) = self.v(y).overflowing_sub(self.v(x));
                self.set_v(x, diff);
                self.regs.set_flag(borrow as u8);
                self.regs.advance_pc();
            }

            Instruction::ShiftLeft { x, .. } => {
                let vx = self.v(x);
                let flag = match self.config.shift_flag {
                    ShiftFlag::Normalized => vx >> 7,
                    ShiftFlag::RawMask => vx & 0x80,
                };
                self.set_v(x, vx << 1);
                self.regs.set_flag(flag);
                self.regs.advance_pc();
            }

            Instruction::RandomMasked { x, nn } => {
                let value = self.random.next_byte() & nn;
                self.set_v(x, value);
                self.regs.advance_pc();
            }

            // ==================== Index & memory ====================
            Instruction::SetIndex { nnn } => {
                self.regs.i = nnn;
                self.regs.advance_pc();
            }

            Instruction::AddToIndex { x } => {
                let offset = self.v(x);
                self.regs.i = self
                    .regs
                    .i
                    .checked_add(offset as u16)
                    .ok_or(CpuError::IndexOverflow { i: self.regs.i, offset })?;
                self.regs.advance_pc();
            }

            Instruction::SetIndexToGlyph { x } => {
                self.regs.i = display::glyph_address(self.v(x));
                self.regs.advance_pc();
            }

            Instruction::StoreDecimalDigits { x } => {
                let vx = self.v(x);
                let digits = [vx / 100, (vx / 10) % 10, vx % 10];
                self.mem.write_slice(self.regs.i as usize, &digits)?;
                self.regs.advance_pc();
            }

            Instruction::DumpRegisters { x } => {
                let count = (x as usize & 0xF) + 1;
                let values = self.regs.v;
                self.mem.write_slice(self.regs.i as usize, &values[..count])?;
                self.regs.advance_pc();
            }

            Instruction::LoadRegisters { x } => {
                let count = (x as usize & 0xF) + 1;
                let bytes = self.mem.slice(self.regs.i as usize, count)?;
                self.regs.v[..count].copy_from_slice(bytes);
                self.regs.advance_pc();
            }

            // ==================== Display ====================
            Instruction::Draw { x, y, n } => {
                self.draw(x, y, n)?;
                self.regs.advance_pc();
            }

            // ==================== Timers & keys ====================
            Instruction::SkipIfKeyPressed { x } => {
                let pressed = self.key(x)?;
                self.regs.skip_if(pressed);
            }

            Instruction::SkipIfKeyNotPressed { x } => {
                let pressed = self.key(x)?;
                self.regs.skip_if(!pressed);
            }

            Instruction::ReadDelayTimer { x } => {
                let delay = self.timers.delay;
                self.set_v(x, delay);
                self.regs.advance_pc();
            }

            Instruction::WaitForKey { x } => match self.keypad.first_pressed() {
                Some(key) => {
                    info!("key {:X} received into V{:X}", key, x);
                    self.set_v(x, key);
                    self.regs.advance_pc();
                }
                None => return Ok(Flow::Blocked),
            },

            Instruction::SetDelayTimer { x } => {
                self.timers.delay = self.v(x);
                self.regs.advance_pc();
            }

            Instruction::SetSoundTimer { x } => {
                self.timers.sound = self.v(x);
                self.regs.advance_pc();
            }
        }

        Ok(Flow::Continue)
    }

    /// XOR an `n`-row sprite from memory at I onto the display at (VX, VY).
    ///
    /// Columns wrap per bit modulo 64. Rows past the bottom edge are
    /// clipped or wrapped according to [`Config::sprite_rows`].
    fn draw(&mut self, x: u8, y: u8, n: u8) -> Result<(), CpuError> {
        let sprite = self.mem.slice(self.regs.i as usize, n as usize)?;
        let col = self.v(x) as usize % display::WIDTH;
        let top = self.v(y) as usize;

        let mut collision = false;
        for (offset, byte) in sprite.iter().enumerate() {
            let row = match self.config.sprite_rows {
                SpriteRows::Clip if top + offset >= display::HEIGHT => break,
                SpriteRows::Clip => top + offset,
                SpriteRows::Wrap => (top + offset) % display::HEIGHT,
            };
            collision |= self.display.blit_byte(row, col, *byte);
        }

        self.regs.set_flag(collision as u8);
        Ok(())
    }

    /// State of the key named by VX.
    fn key(&self, x: u8) -> Result<bool, CpuError> {
        let key = self.v(x);
        self.keypad
            .is_pressed(key)
            .ok_or(CpuError::KeyOutOfRange(key))
    }

    #[inline]
    fn v(&self, x: u8) -> u8 {
        self.regs.v[x as usize & 0xF]
    }

    #[inline]
    fn set_v(&mut self, x: u8, value: u8) {
        self.regs.v[x as usize & 0xF] = value;
    }

    // ==================== Host interface ====================

    /// Count the delay and sound timers down by one. Call at 60Hz.
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    /// Whether the sound timer is running.
    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    /// Replace the whole keypad state.
    pub fn set_keys(&mut self, keys: [bool; KEY_COUNT]) {
        self.keypad.set_all(keys);
    }

    /// Mark a key as held.
    pub fn press_key(&mut self, key: u8) {
        self.keypad.set(key, true);
    }

    /// Mark a key as released.
    pub fn release_key(&mut self, key: u8) {
        self.keypad.set(key, false);
    }

    /// The display, for rendering.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.display
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }

    /// Serializable copy of the machine state, minus memory.
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            state: self.state,
            cycles: self.cycles,
            regs: self.regs.clone(),
            timers: self.timers,
            keypad: self.keypad,
            display: self.display.render().lines().map(str::to_owned).collect(),
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .field("timers", &self.timers)
            .field("config", &self.config)
            .finish()
    }
}

/// Point-in-time machine state for dumping or inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuSnapshot {
    pub state: CpuState,
    pub cycles: u64,
    pub regs: Registers,
    pub timers: Timers,
    pub keypad: Keypad,
    /// One `0`/`1` string per display row.
    pub display: Vec<String>,
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("unknown opcode {opcode:#06X} at PC={pc:#05X}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("stack error: {0}")]
    Stack(#[from] StackError),

    #[error("index overflow: I={i:#06X} + {offset:#04X} exceeds 0xFFFF")]
    IndexOverflow { i: u16, offset: u8 },

    #[error("key index {0:#04X} out of range (0x0-0xF)")]
    KeyOutOfRange(u8),

    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),
}

impl CpuError {
    /// Whether this is a bounds violation (address, index, stack or key).
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            CpuError::Memory(MemoryError::AddressOutOfRange { .. })
                | CpuError::IndexOverflow { .. }
                | CpuError::Stack(_)
                | CpuError::KeyOutOfRange(_)
        )
    }
}
