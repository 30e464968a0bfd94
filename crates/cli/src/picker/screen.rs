//! Double-buffered terminal rendering with line diffing.
//!
//! A [`Screen`] composes a frame of text lines (with inline style tokens),
//! then `flush` compares it against the previously flushed frame and rewrites
//! only the rows that changed. Bounding redraw cost to the changed rows is
//! what keeps the picker flicker-free on every keystroke.
//!
//! Output goes through an owned writer (stderr in production, a buffer in
//! tests); nothing here touches global state.

use std::env;
use std::io::Write;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use log::debug;
use tryspace_core::error::Result;
use tryspace_core::style;

/// Environment override for the viewport width
pub const WIDTH_VAR: &str = "TRY_WIDTH";
/// Environment override for the viewport height
pub const HEIGHT_VAR: &str = "TRY_HEIGHT";

const FALLBACK_SIZE: (u16, u16) = (80, 24);

fn env_dimension(var: &str) -> Option<u16> {
    env::var(var).ok()?.parse::<u16>().ok().filter(|n| *n > 0)
}

/// Double-buffered, token-aware frame writer.
pub struct Screen<W: Write> {
    out: W,
    is_tty: bool,
    buffer: Vec<String>,
    last_buffer: Vec<String>,
    current_line: String,
    width: Option<u16>,
    height: Option<u16>,
    expand_tokens: bool,
    force_colors: bool,
}

impl<W: Write> Screen<W> {
    /// Creates a screen over `out`. `is_tty` decides between diffed ANSI
    /// output and plain stripped text; it is injected so tests can exercise
    /// both paths against an in-memory writer.
    pub fn new(out: W, is_tty: bool) -> Self {
        Self {
            out,
            is_tty,
            buffer: Vec::new(),
            last_buffer: Vec::new(),
            current_line: String::new(),
            width: None,
            height: None,
            expand_tokens: true,
            force_colors: false,
        }
    }

    /// Disables token expansion, leaving tokens literally in the output.
    pub fn disable_token_expansion(&mut self) {
        self.expand_tokens = false;
    }

    /// Disables color output.
    pub fn disable_colors(&mut self) {
        self.expand_tokens = false;
    }

    /// Forces color output even when the writer is not a terminal.
    pub fn force_colors(&mut self) {
        self.force_colors = true;
    }

    /// Appends text to the current line.
    pub fn print(&mut self, text: &str) {
        self.current_line.push_str(text);
    }

    /// Appends text and terminates the current line.
    pub fn puts(&mut self, text: &str) {
        self.current_line.push_str(text);
        self.buffer.push(std::mem::take(&mut self.current_line));
    }

    /// Flushes the composed frame.
    ///
    /// On a terminal (or with colors forced) the cursor is homed and each
    /// line differing from the previous frame is repositioned-to, cleared and
    /// rewritten. Off-terminal, tokens are stripped and the frame is written
    /// once as plain text.
    pub fn flush(&mut self) -> Result<()> {
        if !self.current_line.is_empty() {
            self.buffer.push(std::mem::take(&mut self.current_line));
        }

        if !self.is_tty && !self.force_colors {
            let plain = style::strip_tokens(&self.buffer.join("\n"));
            self.out.write_all(plain.as_bytes())?;
            if !plain.ends_with('\n') {
                self.out.write_all(b"\n")?;
            }
            self.last_buffer.clear();
            self.buffer.clear();
            self.out.flush()?;
            return Ok(());
        }

        if self.is_tty {
            queue!(self.out, MoveTo(0, 0))?;
        }

        let reset = style::expand_tokens("{reset}");
        let max_lines = self.buffer.len().max(self.last_buffer.len());

        for i in 0..max_lines {
            let current = self.buffer.get(i).map_or("", String::as_str);
            let last = self.last_buffer.get(i).map_or("", String::as_str);

            if current == last && !self.force_colors {
                continue;
            }

            if self.is_tty {
                queue!(self.out, MoveTo(0, i as u16), Clear(ClearType::CurrentLine))?;
            }

            if !current.is_empty() {
                let processed = if self.expand_tokens {
                    style::expand_tokens(current)
                } else {
                    current.to_string()
                };
                queue!(self.out, Print(processed))?;
                if self.expand_tokens {
                    queue!(self.out, Print(&reset))?;
                }
                if self.force_colors && !self.is_tty {
                    queue!(self.out, Print("\n"))?;
                }
            }
        }

        self.last_buffer = std::mem::take(&mut self.buffer);
        self.out.flush()?;
        Ok(())
    }

    /// Clears the terminal and both frame buffers, so the next flush is a
    /// full repaint.
    pub fn cls(&mut self) -> Result<()> {
        self.current_line.clear();
        self.buffer.clear();
        self.last_buffer.clear();
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.out.flush()?;
        Ok(())
    }

    pub fn hide_cursor(&mut self) -> Result<()> {
        queue!(self.out, Hide)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn show_cursor(&mut self) -> Result<()> {
        queue!(self.out, Show)?;
        self.out.flush()?;
        Ok(())
    }

    /// Viewport width, cached after the first query.
    pub fn width(&mut self) -> u16 {
        if let Some(width) = self.width {
            return width;
        }
        let width = env_dimension(WIDTH_VAR).unwrap_or_else(|| measured_size().0);
        self.width = Some(width);
        width
    }

    /// Viewport height, cached after the first query.
    pub fn height(&mut self) -> u16 {
        if let Some(height) = self.height {
            return height;
        }
        let height = env_dimension(HEIGHT_VAR).unwrap_or_else(|| measured_size().1);
        self.height = Some(height);
        height
    }

    /// Drops the cached terminal size; called when a resize is observed.
    pub fn refresh_size(&mut self) {
        debug!("viewport size invalidated");
        self.width = None;
        self.height = None;
    }

    /// Consumes the screen, returning the writer. Used by tests to inspect
    /// what was emitted.
    pub fn into_writer(self) -> W {
        self.out
    }
}

fn measured_size() -> (u16, u16) {
    terminal::size().unwrap_or(FALLBACK_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tty_screen() -> Screen<Vec<u8>> {
        Screen::new(Vec::new(), true)
    }

    #[test]
    fn test_flush_writes_changed_lines() {
        let mut screen = tty_screen();
        screen.puts("alpha");
        screen.puts("beta");
        screen.flush().unwrap();

        let out = String::from_utf8(screen.out.clone()).unwrap();
        assert!(out.contains("alpha"));
        assert!(out.contains("beta"));
    }

    #[test]
    fn test_second_flush_of_same_frame_is_cursor_home_only() {
        let mut screen = tty_screen();
        screen.puts("alpha");
        screen.puts("beta");
        screen.flush().unwrap();

        screen.out.clear();
        screen.puts("alpha");
        screen.puts("beta");
        screen.flush().unwrap();

        // MoveTo(0, 0) and nothing else.
        let out = String::from_utf8(screen.out.clone()).unwrap();
        assert_eq!(out, "\x1b[1;1H");
    }

    #[test]
    fn test_flush_rewrites_only_the_changed_row() {
        let mut screen = tty_screen();
        screen.puts("alpha");
        screen.puts("beta");
        screen.flush().unwrap();

        screen.out.clear();
        screen.puts("alpha");
        screen.puts("gamma");
        screen.flush().unwrap();

        let out = String::from_utf8(screen.out.clone()).unwrap();
        assert!(!out.contains("alpha"));
        assert!(out.contains("gamma"));
    }

    #[test]
    fn test_shrinking_frame_clears_stale_rows() {
        let mut screen = tty_screen();
        screen.puts("alpha");
        screen.puts("beta");
        screen.flush().unwrap();

        screen.out.clear();
        screen.puts("alpha");
        screen.flush().unwrap();

        // Row 1 differs (stale "beta" vs empty) so it must be cleared.
        let out = String::from_utf8(screen.out.clone()).unwrap();
        assert!(out.contains("\x1b[2;1H"));
        assert!(out.contains("\x1b[2K"));
        assert!(!out.contains("beta"));
    }

    #[test]
    fn test_non_tty_output_is_plain_text() {
        let mut screen = Screen::new(Vec::new(), false);
        screen.puts("{h1}Title{reset}");
        screen.puts("{dim}body{/fg}");
        screen.flush().unwrap();

        let out = String::from_utf8(screen.out.clone()).unwrap();
        assert_eq!(out, "Title\nbody\n");
    }

    #[test]
    fn test_tty_flush_expands_tokens() {
        let mut screen = tty_screen();
        screen.print("{b}x");
        screen.puts("{/b}");
        screen.flush().unwrap();

        let out = String::from_utf8(screen.out.clone()).unwrap();
        assert!(out.contains("\x1b[1;33mx"));
        assert!(!out.contains("{b}"));
    }

    #[test]
    fn test_cls_forces_full_repaint() {
        let mut screen = tty_screen();
        screen.puts("alpha");
        screen.flush().unwrap();

        screen.cls().unwrap();
        screen.out.clear();
        screen.puts("alpha");
        screen.flush().unwrap();

        let out = String::from_utf8(screen.out.clone()).unwrap();
        assert!(out.contains("alpha"));
    }

    #[test]
    fn test_env_overrides_viewport() {
        env::set_var(WIDTH_VAR, "100");
        env::set_var(HEIGHT_VAR, "42");
        let mut screen = tty_screen();
        assert_eq!(screen.width(), 100);
        assert_eq!(screen.height(), 42);
        env::remove_var(WIDTH_VAR);
        env::remove_var(HEIGHT_VAR);

        // Cached: removing the variables does not change the answer until a
        // refresh is requested.
        assert_eq!(screen.width(), 100);
    }
}
