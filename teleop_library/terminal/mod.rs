//! Terminal I/O for the teleop status screen
//!
//! [`TerminalInterface`] is the seam between the teleop loop and a real
//! terminal: a non-blocking key read plus a tiny line-oriented renderer.
//!
//! The screen is split into `num_lines` equal bands. Logical line `k` is
//! drawn at row `(height / num_lines) * k`, starting at column
//! [`TEXT_COLUMN`]; each `\n`-separated piece of a message goes on the next
//! row down.

#[cfg(feature = "crossterm")]
pub mod crossterm_window;
pub mod mock;

#[cfg(feature = "crossterm")]
pub use crossterm_window::CrosstermWindow;
pub use mock::ScriptedTerminal;

use teleop_core::{TeleopError, TeleopResult};

/// Default number of logical lines the screen is divided into
pub const DEFAULT_NUM_LINES: usize = 10;

/// Column every line starts at
pub const TEXT_COLUMN: u16 = 10;

/// A decoded key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    Char(char),
    /// Ctrl+C delivered as a key because raw mode swallows SIGINT
    Interrupt,
    Other,
}

/// Raw key input and status-line output
pub trait TerminalInterface: Send {
    /// Return the next pending key, or `None` right away if there is none
    fn read_key(&mut self) -> TeleopResult<Option<Key>>;

    fn clear(&mut self) -> TeleopResult<()>;

    /// Draw `message` on logical line `lineno` (see the module docs)
    fn write_line(&mut self, lineno: usize, message: &str) -> TeleopResult<()>;

    /// Push everything written since the last refresh to the screen
    fn refresh(&mut self) -> TeleopResult<()>;

    /// Alert the operator that a key was rejected
    fn beep(&mut self) -> TeleopResult<()>;
}

/// The two lines of the teleop status screen
pub struct StatusLayout;

impl StatusLayout {
    pub const STATUS_LINE: usize = 2;
    pub const HINT_LINE: usize = 5;
    pub const HINT: &'static str = "Use arrow keys to move, space to stop.";

    pub fn status(linear_steps: i32, angular_steps: i32) -> String {
        format!("Linear: {}, Angular: {}", linear_steps, angular_steps)
    }

    /// Clear the screen and draw both lines
    pub fn render<I: TerminalInterface + ?Sized>(
        interface: &mut I,
        linear_steps: i32,
        angular_steps: i32,
    ) -> TeleopResult<()> {
        interface.clear()?;
        interface.write_line(Self::STATUS_LINE, &Self::status(linear_steps, angular_steps))?;
        interface.write_line(Self::HINT_LINE, Self::HINT)?;
        interface.refresh()
    }
}

/// Reject logical line numbers outside `[0, num_lines)`
pub fn check_line(lineno: usize, num_lines: usize) -> TeleopResult<()> {
    if lineno >= num_lines {
        return Err(TeleopError::invalid_input(format!(
            "line number {} out of bounds (screen has {} lines)",
            lineno, num_lines
        )));
    }
    Ok(())
}

/// First screen row of logical line `lineno`
pub fn line_row(lineno: usize, num_lines: usize, height: u16) -> u16 {
    let band = usize::from(height) / num_lines.max(1);
    u16::try_from(band * lineno).unwrap_or(u16::MAX)
}

/// Left-justify `text` to exactly `width` columns, clipping what does not fit
pub fn fit_to_width(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width).collect();
    format!("{:<width$}", clipped, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_line_bounds() {
        assert!(check_line(0, 10).is_ok());
        assert!(check_line(9, 10).is_ok());
        assert!(matches!(check_line(10, 10), Err(TeleopError::InvalidInput(_))));
    }

    #[test]
    fn test_line_row_uses_bands() {
        // 24 rows / 10 lines = bands of 2 rows
        assert_eq!(line_row(0, 10, 24), 0);
        assert_eq!(line_row(2, 10, 24), 4);
        assert_eq!(line_row(5, 10, 24), 10);
        // tiny terminal: every line collapses onto row 0
        assert_eq!(line_row(5, 10, 8), 0);
    }

    #[test]
    fn test_fit_to_width() {
        assert_eq!(fit_to_width("abc", 6), "abc   ");
        assert_eq!(fit_to_width("abcdef", 3), "abc");
        assert_eq!(fit_to_width("", 0), "");
    }

    #[test]
    fn test_status_text() {
        assert_eq!(StatusLayout::status(3, -1), "Linear: 3, Angular: -1");
    }

    #[test]
    fn test_render_draws_both_lines() {
        let mut terminal = ScriptedTerminal::new(DEFAULT_NUM_LINES);
        StatusLayout::render(&mut terminal, 1, 2).unwrap();

        assert_eq!(
            terminal.line(StatusLayout::STATUS_LINE).as_deref(),
            Some("Linear: 1, Angular: 2")
        );
        assert_eq!(
            terminal.line(StatusLayout::HINT_LINE).as_deref(),
            Some(StatusLayout::HINT)
        );
        assert_eq!(terminal.refresh_count(), 1);
    }
}
