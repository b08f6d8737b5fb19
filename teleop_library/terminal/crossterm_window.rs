//! Real terminal backend on crossterm
//!
//! Raw mode plus the alternate screen for the lifetime of the window; the
//! terminal is handed back on [`CrosstermWindow::restore`] or on drop.

use super::{check_line, fit_to_width, line_row, Key, TerminalInterface, TEXT_COLUMN};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout, Write};
use std::time::Duration;
use teleop_core::{TeleopError, TeleopResult};

pub struct CrosstermWindow {
    out: Stdout,
    num_lines: usize,
    restored: bool,
}

impl CrosstermWindow {
    /// Take over the terminal
    pub fn open(num_lines: usize) -> TeleopResult<Self> {
        if num_lines == 0 {
            return Err(TeleopError::invalid_input("window needs at least one line"));
        }

        enable_raw_mode().map_err(|e| TeleopError::terminal(format!("failed to enable raw mode: {}", e)))?;
        let mut out = io::stdout();
        if let Err(e) = execute!(out, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(TeleopError::terminal(format!("failed to enter alternate screen: {}", e)));
        }

        Ok(Self {
            out,
            num_lines,
            restored: false,
        })
    }

    pub fn num_lines(&self) -> usize {
        self.num_lines
    }

    /// Leave the alternate screen and raw mode; safe to call more than once
    pub fn restore(&mut self) -> TeleopResult<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        let screen = execute!(self.out, Show, LeaveAlternateScreen);
        let raw = disable_raw_mode();
        screen.map_err(terminal_err)?;
        raw.map_err(terminal_err)
    }
}

impl Drop for CrosstermWindow {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            tracing::warn!("failed to restore terminal: {}", e);
        }
    }
}

impl TerminalInterface for CrosstermWindow {
    fn read_key(&mut self) -> TeleopResult<Option<Key>> {
        // Drain non-key events (resize, mouse, releases) until a press or nothing
        while event::poll(Duration::ZERO).map_err(terminal_err)? {
            if let Event::Key(key) = event::read().map_err(terminal_err)? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                return Ok(Some(map_key(&key)));
            }
        }
        Ok(None)
    }

    fn clear(&mut self) -> TeleopResult<()> {
        queue!(self.out, Clear(ClearType::All)).map_err(terminal_err)
    }

    fn write_line(&mut self, lineno: usize, message: &str) -> TeleopResult<()> {
        check_line(lineno, self.num_lines)?;
        let (width, height) = terminal::size().map_err(terminal_err)?;
        let text_width = usize::from(width.saturating_sub(TEXT_COLUMN));
        let first_row = line_row(lineno, self.num_lines, height);

        for (offset, piece) in message.split('\n').enumerate() {
            let row = u32::from(first_row) + offset as u32;
            if row >= u32::from(height) {
                break;
            }
            queue!(
                self.out,
                MoveTo(TEXT_COLUMN, row as u16),
                Print(fit_to_width(piece, text_width))
            )
            .map_err(terminal_err)?;
        }
        Ok(())
    }

    fn refresh(&mut self) -> TeleopResult<()> {
        self.out.flush().map_err(terminal_err)
    }

    fn beep(&mut self) -> TeleopResult<()> {
        queue!(self.out, Print('\x07')).map_err(terminal_err)?;
        self.out.flush().map_err(terminal_err)
    }
}

/// Translate a crossterm key event into a teleop [`Key`]
pub fn map_key(event: &KeyEvent) -> Key {
    match event.code {
        KeyCode::Char('c') | KeyCode::Char('C') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Key::Interrupt
        }
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    }
}

fn terminal_err(e: io::Error) -> TeleopError {
    TeleopError::terminal(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_arrows_and_space() {
        assert_eq!(map_key(&press(KeyCode::Up, KeyModifiers::NONE)), Key::Up);
        assert_eq!(map_key(&press(KeyCode::Down, KeyModifiers::NONE)), Key::Down);
        assert_eq!(map_key(&press(KeyCode::Left, KeyModifiers::NONE)), Key::Left);
        assert_eq!(map_key(&press(KeyCode::Right, KeyModifiers::NONE)), Key::Right);
        assert_eq!(map_key(&press(KeyCode::Char(' '), KeyModifiers::NONE)), Key::Space);
    }

    #[test]
    fn test_ctrl_c_is_interrupt() {
        assert_eq!(map_key(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)), Key::Interrupt);
        assert_eq!(map_key(&press(KeyCode::Char('c'), KeyModifiers::NONE)), Key::Char('c'));
    }

    #[test]
    fn test_other_keys() {
        assert_eq!(map_key(&press(KeyCode::Char('q'), KeyModifiers::NONE)), Key::Char('q'));
        assert_eq!(map_key(&press(KeyCode::Enter, KeyModifiers::NONE)), Key::Other);
        assert_eq!(map_key(&press(KeyCode::F(1), KeyModifiers::NONE)), Key::Other);
    }
}
