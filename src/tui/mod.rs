//! TUI debugger and host for the interpreter.
//!
//! Provides an interactive terminal front end with:
//! - The framebuffer drawn with half-block characters
//! - Register, timer and stack view
//! - Step/run/breakpoint controls
//! - Disassembly view
//! - Keypad input and 60Hz timer ticks

mod app;
mod ui;

pub use app::{keymap, DebuggerApp};

use crate::Config;
use std::time::{Duration, Instant};

/// Length of one timer frame.
const FRAME: Duration = Duration::from_micros(16_667);

/// Run the debugger with a program.
pub fn run_debugger(program: Vec<u8>, config: Config, steps_per_frame: u32) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(program, config, steps_per_frame);
    let mut next_frame = Instant::now() + FRAME;

    // Main loop
    while !app.should_quit {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Handle input until the next frame is due
        let timeout = next_frame.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    match key.code {
                        KeyCode::Esc => app.should_quit = true,
                        KeyCode::F(10) => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::F(5) => app.run(),
                        KeyCode::F(6) => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::F(9) => app.toggle_breakpoint(),
                        KeyCode::F(2) => app.reset(),
                        code => {
                            if let Some(k) = keymap(code) {
                                app.press(k);
                            }
                        }
                    }
                }
            }
        }

        if Instant::now() >= next_frame {
            app.frame();
            next_frame += FRAME;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
