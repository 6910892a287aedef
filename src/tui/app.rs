//! Debugger application state and logic.

use crate::asm::disasm::{disassemble_instruction, format_instruction};
use crate::cpu::memory::{MEMORY_SIZE, PROGRAM_START};
use crate::cpu::peripherals::KEY_COUNT;
use crate::{Config, Cpu, Step};
use crossterm::event::KeyCode;
use std::collections::HashSet;

/// How many 60Hz frames a key stays held after a press event.
///
/// Terminals report presses (and auto-repeat) but rarely releases.
const KEY_HOLD_FRAMES: u8 = 6;

/// Map the left four keyboard columns onto the hex keypad.
///
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  <-  |Q|W|E|R|
/// |7|8|9|E|  <-  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
pub fn keymap(code: KeyCode) -> Option<u8> {
    let KeyCode::Char(c) = code else {
        return None;
    };
    match c.to_ascii_lowercase() {
        'x' => Some(0x0),
        '1' => Some(0x1),
        '2' => Some(0x2),
        '3' => Some(0x3),
        'q' => Some(0x4),
        'w' => Some(0x5),
        'e' => Some(0x6),
        'a' => Some(0x7),
        's' => Some(0x8),
        'd' => Some(0x9),
        'z' => Some(0xA),
        'c' => Some(0xB),
        '4' => Some(0xC),
        'r' => Some(0xD),
        'f' => Some(0xE),
        'v' => Some(0xF),
        _ => None,
    }
}

/// Debugger application state.
pub struct DebuggerApp {
    /// The machine being debugged.
    pub cpu: Cpu,
    /// Program image, reloaded on reset.
    pub program: Vec<u8>,
    /// Breakpoints (by address).
    pub breakpoints: HashSet<u16>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Instructions executed per 60Hz frame while running.
    pub steps_per_frame: u32,
    /// Remaining hold frames per key.
    held: [u8; KEY_COUNT],
    /// Set by `run` so execution can leave the breakpoint it sits on.
    resuming: bool,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    pub fn new(program: Vec<u8>, config: Config, steps_per_frame: u32) -> Self {
        let mut cpu = Cpu::with_config(config);
        let status = match cpu.load_program(&program) {
            Ok(()) => "Ready. F10 step, F5 run, F6 pause, F9 breakpoint, Esc quit.".to_string(),
            Err(e) => format!("Load failed: {}", e),
        };

        Self {
            cpu,
            program,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status,
            steps_per_frame: steps_per_frame.max(1),
            held: [0; KEY_COUNT],
            resuming: false,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if !self.cpu.is_running() {
            self.status = format!("CPU halted: {:?}", self.cpu.state);
            self.running = false;
            return;
        }

        let pc = self.cpu.regs.pc;
        match self.cpu.step() {
            Ok(Step::Executed(instr)) => {
                self.status = format!("PC={:03X}: {}", pc, format_instruction(&instr));
            }
            Ok(Step::WaitingForKey(_)) => {
                self.status = format!("PC={:03X}: waiting for key", pc);
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
            }
        }
    }

    /// Run until breakpoint or error.
    pub fn run(&mut self) {
        self.running = true;
        self.resuming = true;
        self.status = "Running...".into();
    }

    /// Advance one 60Hz frame: run a batch of instructions, then tick
    /// timers and age held keys.
    pub fn frame(&mut self) {
        if self.running {
            for _ in 0..self.steps_per_frame {
                if !self.cpu.is_running() {
                    self.running = false;
                    self.status = format!("Halted after {} cycles", self.cpu.cycles);
                    break;
                }

                let pc = self.cpu.regs.pc;
                if !self.resuming && self.breakpoints.contains(&pc) {
                    self.running = false;
                    self.status = format!("Breakpoint at PC={:03X}", pc);
                    break;
                }

                self.resuming = false;
                self.step();
                if !self.running {
                    break;
                }
            }
        }

        self.cpu.tick_timers();
        for (key, frames) in self.held.iter_mut().enumerate() {
            if *frames > 0 {
                *frames -= 1;
                if *frames == 0 {
                    self.cpu.release_key(key as u8);
                }
            }
        }
    }

    /// Register a key press from the terminal.
    pub fn press(&mut self, key: u8) {
        if let Some(frames) = self.held.get_mut(key as usize) {
            *frames = KEY_HOLD_FRAMES;
            self.cpu.press_key(key);
        }
    }

    /// Toggle breakpoint at current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.cpu.regs.pc;
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={:03X}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={:03X}", pc);
        }
    }

    /// Reset CPU to initial state.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.held = [0; KEY_COUNT];
        self.running = false;
        self.status = match self.cpu.load_program(&self.program) {
            Ok(()) => "Reset. Ready.".into(),
            Err(e) => format!("Load failed: {}", e),
        };
    }

    /// Get disassembly around current PC.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(u16, String, bool)> {
        let pc = self.cpu.regs.pc as usize;
        let start = pc.saturating_sub(lines / 2 * 2).max(PROGRAM_START as usize);

        (0..lines)
            .map(|i| start + i * 2)
            .filter(|addr| addr + 1 < MEMORY_SIZE)
            .filter_map(|addr| {
                let word = self.cpu.mem.read_word(addr).ok()?;
                Some((addr as u16, disassemble_instruction(word), addr == pc))
            })
            .collect()
    }
}
