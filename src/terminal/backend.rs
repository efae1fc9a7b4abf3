use crate::ui::view::{LineStyle, ViewFrame};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent,
    KeyCode as CrosstermKeyCode, KeyEvent as CrosstermKeyEvent, KeyEventKind,
    KeyModifiers as CrosstermKeyModifiers, MouseButton, MouseEventKind,
};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{
    self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use std::io::{self, Stdout, Write};
use std::time::Duration;
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Unknown,
    Char(char),
    Enter,
    Tab,
    BackTab,
    Esc,
    Backspace,
    Delete,
    Up,
    Down,
}

/// A key press; only Control matters to the lookup field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub ctrl: bool,
}

impl KeyEvent {
    pub fn plain(code: KeyCode) -> Self {
        Self { code, ctrl: false }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self { code, ctrl: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEvent {
    Key(KeyEvent),
    MouseDown { col: u16, row: u16 },
    MouseUp { col: u16, row: u16 },
    Resize { width: u16, height: u16 },
    Tick,
}

pub struct Terminal {
    stdout: Stdout,
    width: u16,
    height: u16,
}

impl Terminal {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self {
            stdout: io::stdout(),
            width,
            height,
        })
    }

    pub fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            DisableLineWrap,
            Hide
        )
    }

    pub fn exit(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(
            self.stdout,
            DisableMouseCapture,
            LeaveAlternateScreen,
            EnableLineWrap,
            Show
        )
    }

    pub fn poll_event(&mut self, timeout: Duration) -> io::Result<TerminalEvent> {
        if !event::poll(timeout)? {
            return Ok(TerminalEvent::Tick);
        }
        let mapped = match event::read()? {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                TerminalEvent::Key(key_from_crossterm(key))
            }
            CrosstermEvent::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => TerminalEvent::MouseDown {
                    col: mouse.column,
                    row: mouse.row,
                },
                MouseEventKind::Up(MouseButton::Left) => TerminalEvent::MouseUp {
                    col: mouse.column,
                    row: mouse.row,
                },
                _ => TerminalEvent::Tick,
            },
            CrosstermEvent::Resize(width, height) => {
                self.width = width;
                self.height = height;
                TerminalEvent::Resize { width, height }
            }
            _ => TerminalEvent::Tick,
        };
        Ok(mapped)
    }

    pub fn render(&mut self, frame: &ViewFrame) -> io::Result<()> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }

        queue!(self.stdout, MoveTo(0, 0), Clear(ClearType::All))?;
        for (row, line) in frame.lines.iter().take(self.height as usize).enumerate() {
            queue!(self.stdout, MoveTo(0, row as u16))?;
            match line.style {
                LineStyle::Plain => {}
                LineStyle::Dim => queue!(self.stdout, SetForegroundColor(Color::DarkGrey))?,
                LineStyle::Highlight => queue!(
                    self.stdout,
                    SetForegroundColor(Color::Cyan),
                    SetAttribute(Attribute::Bold)
                )?,
                LineStyle::Error => queue!(self.stdout, SetForegroundColor(Color::Red))?,
            }
            queue!(
                self.stdout,
                Print(clip_to_width(&line.text, self.width as usize)),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?;
        }

        match frame.cursor {
            Some((col, row)) if row < self.height => {
                let col = col.min(self.width.saturating_sub(1));
                queue!(self.stdout, MoveTo(col, row), Show)?;
            }
            _ => queue!(self.stdout, Hide)?,
        }
        self.stdout.flush()
    }
}

fn key_from_crossterm(key: CrosstermKeyEvent) -> KeyEvent {
    let code = match key.code {
        CrosstermKeyCode::Char(ch) => KeyCode::Char(ch),
        CrosstermKeyCode::Enter => KeyCode::Enter,
        CrosstermKeyCode::Tab => KeyCode::Tab,
        CrosstermKeyCode::BackTab => KeyCode::BackTab,
        CrosstermKeyCode::Esc => KeyCode::Esc,
        CrosstermKeyCode::Backspace => KeyCode::Backspace,
        CrosstermKeyCode::Delete => KeyCode::Delete,
        CrosstermKeyCode::Up => KeyCode::Up,
        CrosstermKeyCode::Down => KeyCode::Down,
        _ => KeyCode::Unknown,
    };
    KeyEvent {
        code,
        ctrl: key.modifiers.contains(CrosstermKeyModifiers::CONTROL),
    }
}

/// Truncates `text` to at most `columns` display cells, dropping line breaks.
pub(crate) fn clip_to_width(text: &str, columns: usize) -> String {
    text.chars()
        .filter(|ch| !matches!(ch, '\n' | '\r'))
        .scan(0usize, |taken, ch| {
            *taken += ch.width().unwrap_or(0);
            (*taken <= columns).then_some(ch)
        })
        .collect()
}
