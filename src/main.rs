//! plan8 - CLI Entry Point
//!
//! Commands:
//! - `plan8 run <rom>` - Run a ROM headless and print the final state
//! - `plan8 debug <rom>` - Interactive terminal debugger
//! - `plan8 disasm <rom>` - Disassemble a ROM
//! - `plan8 test` - Built-in self-test

use clap::{Args, Parser, Subcommand};
use log::{error, info};
use plan8::{Config, ShiftFlag, SpriteRows};

#[derive(Parser)]
#[command(name = "plan8")]
#[command(version = "0.1.0")]
#[command(about = "A CHIP-8 virtual machine interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Interpreter behaviour options shared by `run` and `debug`.
#[derive(Args)]
struct ConfigArgs {
    /// JSON file with interpreter options
    #[arg(long)]
    config: Option<String>,
    /// 8XYE stores VX & 0x80 in VF instead of 0/1
    #[arg(long)]
    raw_shift_flag: bool,
    /// Sprite rows past the bottom edge wrap to the top instead of clipping
    #[arg(long)]
    wrap_rows: bool,
}

impl ConfigArgs {
    fn resolve(&self) -> Config {
        let mut config = match &self.config {
            Some(path) => match Config::load(path) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("❌ Failed to load config: {}", e);
                    std::process::exit(1);
                }
            },
            None => Config::default(),
        };
        if self.raw_shift_flag {
            config.shift_flag = ShiftFlag::RawMask;
        }
        if self.wrap_rows {
            config.sprite_rows = SpriteRows::Wrap;
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a ROM without a display and print the final machine state
    Run {
        /// Path to the ROM image
        rom: String,
        /// Maximum number of instructions to execute
        #[arg(short, long, default_value = "10000")]
        max_cycles: u64,
        /// Instructions per 60Hz timer tick
        #[arg(long, default_value = "10")]
        cycles_per_tick: u64,
        /// Print every executed instruction
        #[arg(short, long)]
        trace: bool,
        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Interactive terminal debugger
    Debug {
        /// Path to the ROM image
        rom: String,
        /// Instructions per 60Hz frame
        #[arg(long, default_value = "10")]
        speed: u32,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Disassemble a ROM to readable text
    Disasm {
        /// Path to the ROM image
        rom: String,
    },
    /// Run the built-in self-test
    Test,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { rom, max_cycles, cycles_per_tick, trace, json, config }) => {
            run_program(&rom, max_cycles, cycles_per_tick, trace, json, config.resolve());
        }
        Some(Commands::Debug { rom, speed, config }) => {
            debug_program(&rom, speed, config.resolve());
        }
        Some(Commands::Disasm { rom }) => {
            disassemble_file(&rom);
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("plan8 v0.1.0");
            println!("A CHIP-8 virtual machine interpreter");
            println!();
            println!("Use --help for available commands");
        }
    }
}

fn read_rom(path: &str) -> Vec<u8> {
    match plan8::load_rom(path) {
        Ok(image) => {
            info!("loaded {} bytes from {}", image.len(), path);
            image
        }
        Err(e) => {
            eprintln!("❌ Failed to load ROM: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_program(path: &str, max_cycles: u64, cycles_per_tick: u64, trace: bool, json: bool, config: Config) {
    use plan8::{Cpu, Step};
    use plan8::asm::disasm::format_instruction;

    let image = read_rom(path);

    let mut cpu = Cpu::with_config(config);
    if let Err(e) = cpu.load_program(&image) {
        eprintln!("❌ Failed to load program: {}", e);
        std::process::exit(1);
    }
    info!("interpreter options: {:?}", cpu.config());

    if !json {
        println!("🔧 Running: {} ({} bytes)", path, image.len());
        println!();
        println!("━━━ Execution ━━━");
    }

    let cycles_per_tick = cycles_per_tick.max(1);
    let mut failure = None;
    let mut waiting = false;
    while cpu.cycles < max_cycles {
        let pc = cpu.regs.pc;

        match cpu.step() {
            Ok(Step::Executed(instr)) => {
                if trace && !json {
                    println!("{:03X}: {:<18} I={:03X} VF={:02X}",
                        pc, format_instruction(&instr), cpu.regs.i, cpu.regs.flag());
                }
                if cpu.cycles % cycles_per_tick == 0 {
                    cpu.tick_timers();
                }
            }
            Ok(Step::WaitingForKey(_)) => {
                // No keyboard in headless mode.
                waiting = true;
                break;
            }
            Err(e) => {
                error!("execution stopped at PC={:03X}: {}", pc, e);
                failure = Some(e);
                break;
            }
        }
    }

    if json {
        match serde_json::to_string_pretty(&cpu.snapshot()) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to serialize state: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!();
        println!("━━━ Result ━━━");
        println!("Cycles: {}", cpu.cycles);
        println!("State: {:?}", cpu.state);
        for bank in cpu.regs.v.chunks(8).enumerate() {
            let (n, values) = bank;
            let line: Vec<String> = values
                .iter()
                .enumerate()
                .map(|(i, v)| format!("V{:X}={:02X}", n * 8 + i, v))
                .collect();
            println!("{}", line.join(" "));
        }
        println!("I={:03X} PC={:03X} SP={} DT={} ST={}",
            cpu.regs.i, cpu.regs.pc, cpu.regs.stack.pointer(),
            cpu.timers.delay, cpu.timers.sound);
        println!();
        println!("{}", cpu.framebuffer().render_with('█', '·'));

        if waiting {
            println!();
            println!("⏸  Program is waiting for a key press at PC={:03X}.", cpu.regs.pc);
        } else if cpu.cycles >= max_cycles {
            println!();
            println!("⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.", max_cycles);
        }
    }

    if let Some(e) = failure {
        eprintln!("❌ CPU error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "tui")]
fn debug_program(path: &str, speed: u32, config: Config) {
    let image = read_rom(path);

    println!("🚀 Launching debugger...");

    if let Err(e) = plan8::run_debugger(image, config, speed) {
        eprintln!("❌ Debugger error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn debug_program(_path: &str, _speed: u32, _config: Config) {
    eprintln!("❌ Built without the `tui` feature; the debugger is unavailable.");
    std::process::exit(1);
}

fn disassemble_file(path: &str) {
    use plan8::cpu::PROGRAM_START;

    println!("📖 Disassembling: {}", path);
    println!();

    let image = read_rom(path);
    print!("{}", plan8::disassemble(&image, PROGRAM_START));
}

fn run_self_test() {
    use plan8::cpu::decode::assemble_words;
    use plan8::{Cpu, Instruction, Sequence};

    println!("━━━ plan8 Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;
    let mut check = |name: &str, ok: bool| {
        if ok {
            println!("{}... ✓", name);
            passed += 1;
        } else {
            println!("{}... ✗", name);
            failed += 1;
        }
    };

    // Load immediate
    let mut cpu = Cpu::new();
    let ok = cpu.load_program(&[0x6A, 0x11]).is_ok()
        && cpu.step().is_ok()
        && cpu.regs.v[0xA] == 0x11
        && cpu.regs.pc == 0x202;
    check("Load immediate", ok);

    // Carry flag
    let mut cpu = Cpu::new();
    let program = assemble_words(&[
        Instruction::SetImmediate { x: 0, nn: 200 },
        Instruction::SetImmediate { x: 1, nn: 100 },
        Instruction::AddRegisters { x: 0, y: 1 },
    ]);
    let ok = cpu.load_program(&program).is_ok()
        && cpu.run_limited(3).is_ok()
        && cpu.regs.v[0] == 44
        && cpu.regs.v[0xF] == 1;
    check("Add with carry", ok);

    // Decimal digits
    let mut cpu = Cpu::new();
    let program = assemble_words(&[
        Instruction::SetImmediate { x: 2, nn: 197 },
        Instruction::SetIndex { nnn: 0x300 },
        Instruction::StoreDecimalDigits { x: 2 },
    ]);
    let ok = cpu.load_program(&program).is_ok()
        && cpu.run_limited(3).is_ok()
        && cpu.mem.slice(0x300, 3).map(|d| d == [1, 9, 7]).unwrap_or(false);
    check("Decimal digits", ok);

    // Draw twice erases with collision
    let mut cpu = Cpu::new();
    let program = assemble_words(&[
        Instruction::SetImmediate { x: 0, nn: 60 },
        Instruction::SetIndexToGlyph { x: 1 },
        Instruction::Draw { x: 0, y: 1, n: 5 },
        Instruction::Draw { x: 0, y: 1, n: 5 },
    ]);
    let ok = cpu.load_program(&program).is_ok()
        && cpu.run_limited(4).is_ok()
        && cpu.framebuffer().is_blank()
        && cpu.regs.v[0xF] == 1;
    check("Draw/erase collision", ok);

    // Injected random source
    let mut cpu = Cpu::with_options(Config::default(), Some(Box::new(Sequence::new([0xFF]))));
    let program = assemble_words(&[Instruction::RandomMasked { x: 3, nn: 0x3C }]);
    let ok = cpu.load_program(&program).is_ok() && cpu.step().is_ok() && cpu.regs.v[3] == 0x3C;
    check("Random mask", ok);

    // Unknown opcode halts
    let mut cpu = Cpu::new();
    let ok = cpu.load_program(&[0xFF, 0xFF]).is_ok() && cpu.step().is_err() && !cpu.is_running();
    check("Unknown opcode halts", ok);

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
