//! Player — the runtime playback driver.
//!
//! Owns the tick timer: while playing it advances the document one step per
//! interval, resolves the scene through the engine, rasterizes it and writes
//! only the changed cells to the terminal. Reaching the end of the document
//! stops auto-advance.

pub mod config;
mod menubar;
pub mod playback;

use std::io::{self, Write};
use std::time::Instant;

use anyhow::{bail, Result};
use crossterm::event::{KeyCode, KeyEvent};
use crossterm::{cursor, event, execute, queue, style, terminal};

use crate::engine::{Document, Engine};
use crate::renderer::Renderer;
use crate::types::{Cell, Color, NamedColor, Style, TerminalContract};

use config::{matches_binding, PlayerConfig};
use menubar::render_menubar;
use playback::{Command, Playback};

/// Rows reserved above the canvas for the menu bar.
const CANVAS_OFFSET: u16 = 1;

/// Digits accepted for a typed step number; enough for any `usize`.
const MAX_STEP_DIGITS: usize = 20;

pub struct Player {
    playback: Playback,
    config: PlayerConfig,
    renderer: Renderer,
    contract: TerminalContract,
    grid: Vec<Vec<Cell>>,
    /// Step number being typed, 1-based like the status line.
    step_entry: String,
}

enum Input {
    Command(Command),
    /// The typed step number changed.
    Entry,
    Quit,
    Ignored,
}

impl Player {
    pub fn new(doc: Document, config: PlayerConfig) -> Self {
        let renderer = Renderer::new(config.cell_width, config.cell_height);
        let contract = renderer.contract(doc.width(), doc.height());
        Self {
            playback: Playback::new(doc, config.tick_ms),
            config,
            renderer,
            contract,
            grid: Vec::new(),
            step_entry: String::new(),
        }
    }

    /// Play the document in the terminal.
    ///
    /// Sets up the terminal, enters the event loop, and restores the terminal
    /// on exit (even on error).
    pub fn play(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        let need_w = self.contract.width;
        let need_h = self.contract.height;
        // +2: one row for menu bar, one row for status bar
        if term_w < need_w || term_h < need_h + 2 {
            bail!(
                "Terminal too small: need {}x{}, have {}x{} (adjust cell_width/cell_height in the player config)",
                need_w,
                need_h + 2,
                term_w,
                term_h,
            );
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout);

        // Always restore terminal state.
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        self.render_menubar(stdout)?;
        self.render_full(stdout)?;
        self.render_status(stdout)?;

        let mut next_tick = Instant::now() + self.playback.interval();

        loop {
            let timeout = next_tick.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                match event::read()? {
                    event::Event::Key(key) => match self.map_key(&key) {
                        Input::Quit => break,
                        Input::Command(command) => {
                            if self.playback.apply(command) {
                                self.render_diff(stdout)?;
                            }
                            if matches!(command, Command::TogglePlay) {
                                next_tick = Instant::now() + self.playback.interval();
                            }
                            self.render_status(stdout)?;
                        }
                        Input::Entry => self.render_status(stdout)?,
                        Input::Ignored => {}
                    },
                    event::Event::Resize(_, _) => {
                        queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
                        self.render_menubar(stdout)?;
                        self.render_full(stdout)?;
                        self.render_status(stdout)?;
                    }
                    _ => {}
                }
                continue;
            }

            next_tick = Instant::now() + self.playback.interval();
            let was_playing = self.playback.is_playing();
            if self.playback.tick() {
                self.render_diff(stdout)?;
            }
            if was_playing {
                self.render_status(stdout)?;
            }
        }

        Ok(())
    }

    fn map_key(&mut self, key: &KeyEvent) -> Input {
        if key.kind != event::KeyEventKind::Press {
            return Input::Ignored;
        }
        let kb = &self.config.key_bindings;
        if matches_binding(&kb.quit, key) || matches_binding("Esc", key) {
            return Input::Quit;
        }
        let table = [
            (&kb.toggle_play, Command::TogglePlay),
            (&kb.next_step, Command::NextStep),
            (&kb.prev_step, Command::PrevStep),
            (&kb.first_step, Command::FirstStep),
            (&kb.last_step, Command::LastStep),
            (&kb.faster, Command::Faster),
            (&kb.slower, Command::Slower),
            (&kb.select_next, Command::SelectNext),
            (&kb.clear, Command::Clear),
        ];
        if let Some((_, command)) = table.iter().find(|(binding, _)| matches_binding(binding, key)) {
            return Input::Command(*command);
        }
        self.edit_step_entry(key)
    }

    /// Digits build up a step number, Backspace erases, Enter jumps to it.
    fn edit_step_entry(&mut self, key: &KeyEvent) -> Input {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() && self.step_entry.len() < MAX_STEP_DIGITS => {
                self.step_entry.push(c);
                Input::Entry
            }
            KeyCode::Backspace if !self.step_entry.is_empty() => {
                self.step_entry.pop();
                Input::Entry
            }
            KeyCode::Enter if !self.step_entry.is_empty() => {
                let number = self.step_entry.parse::<usize>().unwrap_or(usize::MAX);
                self.step_entry.clear();
                Input::Command(Command::GoTo(number.saturating_sub(1)))
            }
            _ => Input::Ignored,
        }
    }

    // -----------------------------------------------------------------------
    // Grid management
    // -----------------------------------------------------------------------

    fn current_grid(&self) -> Vec<Vec<Cell>> {
        let doc = &self.playback.doc;
        let scene = Engine::resolve_step(doc, doc.step(), self.playback.selected());
        self.renderer.rasterize(&scene)
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn render_menubar(&self, stdout: &mut io::Stdout) -> Result<()> {
        let kb = &self.config.key_bindings;
        let items = [
            format!("[{}] play/pause", kb.toggle_play),
            format!("[{}][{}] step", kb.prev_step, kb.next_step),
            format!("[{}][{}] first/last", kb.first_step, kb.last_step),
            format!("[{}][{}] speed", kb.faster, kb.slower),
            format!("[{}] select", kb.select_next),
            format!("[{}] clear", kb.clear),
            "[0-9][Enter] go to step".to_string(),
            format!("[{}][Esc] quit", kb.quit),
        ];
        render_menubar(stdout, &items)
    }

    fn render_full(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        self.grid = self.current_grid();
        for (y, row) in self.grid.iter().enumerate() {
            queue!(stdout, cursor::MoveTo(0, y as u16 + CANVAS_OFFSET))?;
            for cell in row {
                let cs = to_content_style(&cell.style);
                queue!(
                    stdout,
                    style::PrintStyledContent(style::StyledContent::new(cs, cell.ch))
                )?;
            }
        }
        stdout.flush()?;
        Ok(())
    }

    fn render_diff(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let next = self.current_grid();
        for change in Renderer::diff(&self.grid, &next) {
            let cs = to_content_style(&change.cell.style);
            queue!(
                stdout,
                cursor::MoveTo(change.x, change.y + CANVAS_OFFSET),
                style::PrintStyledContent(style::StyledContent::new(cs, change.cell.ch)),
            )?;
        }
        self.grid = next;
        stdout.flush()?;
        Ok(())
    }

    fn render_status(&self, stdout: &mut io::Stdout) -> Result<()> {
        let status_y = self.contract.height + CANVAS_OFFSET;
        let (_, term_h) = terminal::size()?;
        if status_y >= term_h {
            return Ok(()); // No room for status bar.
        }

        let doc = &self.playback.doc;
        let selected = self
            .playback
            .selected()
            .and_then(|i| doc.shapes().get(i))
            .map_or("none", |shape| shape.display_name());
        let mut status = format!(
            " Step {}/{} | {} | tick {} ms | selected: {} ",
            doc.step() + 1,
            doc.duration(),
            if self.playback.is_playing() { "playing" } else { "paused" },
            self.playback.interval().as_millis(),
            selected,
        );
        if !self.step_entry.is_empty() {
            status.push_str(&format!("| go to: {} ", self.step_entry));
        }

        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);

        queue!(
            stdout,
            cursor::MoveTo(0, status_y),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, status)),
        )?;
        stdout.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = &s.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if s.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    cs
}

pub fn to_ct_color(c: &Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb {
            r: *r,
            g: *g,
            b: *b,
        },
    }
}
