//! UI rendering for the debugger.

use super::app::DebuggerApp;
use crate::display::{HEIGHT, WIDTH};
use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(WIDTH as u16 + 2), Constraint::Min(30)])
        .split(frame.area());

    // Left side: display and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEIGHT as u16 / 2 + 2),
            Constraint::Length(3),
            Constraint::Min(4),
        ])
        .split(chunks[0]);

    draw_display(frame, left_chunks[0], app);
    draw_status(frame, left_chunks[1], app);
    draw_help(frame, left_chunks[2]);

    // Right side: disassembly and registers
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(10)])
        .split(chunks[1]);

    draw_disassembly(frame, right_chunks[0], app);
    draw_registers(frame, right_chunks[1], app);
}

/// Pack two pixel rows into one line of half blocks.
fn half_block(upper: bool, lower: bool) -> char {
    match (upper, lower) {
        (true, true) => '█',
        (true, false) => '▀',
        (false, true) => '▄',
        (false, false) => ' ',
    }
}

/// Draw the framebuffer, two pixel rows per terminal line.
fn draw_display(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let pixels = app.cpu.framebuffer().snapshot();
    let lines: Vec<Line> = pixels
        .chunks(2)
        .map(|pair| {
            let text: String = (0..WIDTH)
                .map(|col| half_block(pair[0][col], pair[1][col]))
                .collect();
            Line::from(text)
        })
        .collect();

    let border = if app.cpu.sound_active() { Color::Yellow } else { Color::Cyan };
    let display = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Display ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)));

    frame.render_widget(display, area);
}

/// Draw disassembly view.
fn draw_disassembly(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let disasm = app.get_disassembly((area.height as usize).saturating_sub(2));

    let items: Vec<ListItem> = disasm
        .iter()
        .map(|(addr, instr, is_current)| {
            let prefix = if *is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(addr) { "●" } else { " " };
            let text = format!("{}{:03X}: {}", prefix, addr, instr);

            let style = if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(addr) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(format!("{} {}", bp, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Disassembly ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw register state.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = &app.cpu.regs;
    let bank = |range: std::ops::Range<usize>| -> Line<'static> {
        let spans: Vec<Span> = range
            .map(|r| {
                let style = if r == 0xF {
                    Style::default().fg(Color::Magenta)
                } else {
                    Style::default().fg(Color::White)
                };
                Span::styled(format!("V{:X}={:02X} ", r, regs.v[r]), style)
            })
            .collect();
        Line::from(spans)
    };

    let content = vec![
        bank(0..8),
        bank(8..16),
        Line::from(vec![
            Span::raw("I: "),
            Span::styled(format!("{:03X}", regs.i), Style::default().fg(Color::White)),
            Span::raw("   PC: "),
            Span::styled(format!("{:03X}", regs.pc), Style::default().fg(Color::Yellow)),
            Span::raw("   SP: "),
            Span::styled(format!("{}", regs.stack.pointer()), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::raw("DT: "),
            Span::styled(format!("{:3}", app.cpu.timers.delay), Style::default().fg(Color::White)),
            Span::raw("   ST: "),
            Span::styled(format!("{:3}", app.cpu.timers.sound), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::raw("Cycles: "),
            Span::styled(format!("{}", app.cpu.cycles), Style::default().fg(Color::Cyan)),
            Span::raw("   State: "),
            Span::styled(format!("{:?}", app.cpu.state),
                if app.cpu.is_running() {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Red)
                }),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("F10: Step  F5: Run  F6: Pause  F9: Breakpoint"),
        Line::from("F2: Reset  Esc: Quit  Keypad: 1-4 Q-R A-F Z-V"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}
