//! Interactive try-directory selector.
//!
//! The selection loop is a small state machine: browsing, delete mode (one or
//! more rows marked), and a full-screen delete confirmation. Every iteration
//! re-ranks the cached candidate list against the live query, clamps the
//! highlighted row, renders through the diffing [`Screen`] and blocks for one
//! input event. The loop ends by producing an [`Outcome`].

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, Local};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::tty::IsTty;
use indexmap::IndexSet;
use itertools::Itertools;
use log::debug;

use tryspace_core::error::{Error, Result};
use tryspace_core::fuzzy::{self, highlight_matches};
use tryspace_core::naming::{date_prefix, slugify};
use tryspace_core::tries::{load_try_dirs, rank_try_dirs, DeleteTarget, TryDir};

use super::input::{InputEvent, Key, KeySource};
use super::screen::Screen;
use super::types::Outcome;

/// Guard that restores the terminal's cooked mode when dropped, on every
/// exit path including panics and early errors.
struct RawModeGuard;

impl RawModeGuard {
    fn acquire() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Construction options for a [`Picker`].
#[derive(Debug, Default)]
pub struct PickerOptions {
    /// Query seed from the command line
    pub search_term: String,
    /// Typed-ahead input injected by the test harness
    pub initial_input: Option<String>,
    /// Render one frame and exit without reading input
    pub render_once: bool,
    /// Skip the clear-screen/hide-cursor setup and teardown
    pub no_cls: bool,
    /// Out-of-band answer for the delete confirmation
    pub confirm: Option<String>,
}

/// Interactive directory selector with fuzzy matching.
pub struct Picker<W: Write> {
    base_path: PathBuf,
    screen: Screen<W>,
    keys: Box<dyn KeySource>,

    query: String,
    input_cursor: usize,
    cursor_pos: usize,
    scroll_offset: usize,
    marked: IndexSet<PathBuf>,
    delete_mode: bool,
    delete_status: Option<String>,
    all_tries: Option<Vec<TryDir>>,

    render_once: bool,
    no_cls: bool,
    confirm_override: Option<String>,
}

impl<W: Write> Picker<W> {
    pub fn new(
        base_path: impl Into<PathBuf>,
        options: PickerOptions,
        screen: Screen<W>,
        keys: Box<dyn KeySource>,
    ) -> Self {
        let query = slugify(
            options
                .initial_input
                .as_deref()
                .unwrap_or(&options.search_term),
        );
        let input_cursor = query.chars().count();
        let no_cls = options.no_cls || keys.is_scripted();

        Self {
            base_path: base_path.into(),
            screen,
            keys,
            input_cursor,
            query,
            cursor_pos: 0,
            scroll_offset: 0,
            marked: IndexSet::new(),
            delete_mode: false,
            delete_status: None,
            all_tries: None,
            render_once: options.render_once,
            no_cls,
            confirm_override: options.confirm,
        }
    }

    /// Runs the selection loop to completion.
    pub fn run(&mut self) -> Result<Outcome> {
        fs::create_dir_all(&self.base_path)
            .map_err(|e| Error::io_error("tries directory", &self.base_path, e))?;

        if !self.no_cls {
            self.screen.cls()?;
            self.screen.hide_cursor()?;
        }

        let result = self.run_inner();

        if !self.no_cls {
            let _ = self.screen.cls();
            let _ = self.screen.show_cursor();
        }

        result
    }

    fn run_inner(&mut self) -> Result<Outcome> {
        if self.render_once && !self.keys.is_scripted() {
            let tries = self.ranked();
            self.render(&tries)?;
            return Ok(Outcome::Cancelled);
        }

        if self.keys.is_scripted() {
            return self.main_loop();
        }

        if !io::stdin().is_tty() || !io::stderr().is_tty() {
            self.screen.puts(&Error::NotATerminal.to_string());
            self.screen.flush()?;
            return Ok(Outcome::Cancelled);
        }

        let _raw = RawModeGuard::acquire()?;
        self.main_loop()
    }

    /// Consumes the picker and returns its screen, for tests that inspect
    /// rendered output.
    pub fn into_screen(self) -> Screen<W> {
        self.screen
    }

    fn ranked(&mut self) -> Vec<TryDir> {
        let base_path = &self.base_path;
        let all = self
            .all_tries
            .get_or_insert_with(|| load_try_dirs(base_path));
        rank_try_dirs(all, &self.query, Local::now())
    }

    fn main_loop(&mut self) -> Result<Outcome> {
        loop {
            let tries = self.ranked();
            let show_create_new = !self.query.is_empty();
            let total_items = tries.len() + usize::from(show_create_new);

            self.cursor_pos = self.cursor_pos.min(total_items.saturating_sub(1));

            self.render(&tries)?;

            let key = match self.keys.next_event()? {
                InputEvent::Resize => {
                    // Re-measure and force a full repaint; no key consumed.
                    self.screen.refresh_size();
                    self.screen.cls()?;
                    continue;
                }
                InputEvent::Key(key) => key,
            };

            match key {
                Key::Confirm => {
                    if self.delete_mode && !self.marked.is_empty() {
                        if let Some(outcome) = self.confirm_batch_delete(&tries)? {
                            return Ok(outcome);
                        }
                    } else if self.cursor_pos < tries.len() {
                        return Ok(Outcome::Selected(tries[self.cursor_pos].path.clone()));
                    } else if show_create_new {
                        return Ok(self.create_new_outcome());
                    }
                }

                Key::Up => self.cursor_pos = self.cursor_pos.saturating_sub(1),
                Key::Down => {
                    if total_items > 0 {
                        self.cursor_pos = (self.cursor_pos + 1).min(total_items - 1);
                    }
                }

                Key::CursorStart => self.input_cursor = 0,
                Key::CursorEnd => self.input_cursor = self.query.chars().count(),
                Key::CursorLeft => self.input_cursor = self.input_cursor.saturating_sub(1),
                Key::CursorRight => {
                    self.input_cursor = (self.input_cursor + 1).min(self.query.chars().count());
                }

                Key::Backspace => {
                    if self.input_cursor > 0 {
                        self.remove_query_char(self.input_cursor - 1);
                        self.input_cursor -= 1;
                    }
                    self.cursor_pos = 0;
                }
                Key::DeleteForward => {
                    if self.input_cursor < self.query.chars().count() {
                        self.remove_query_char(self.input_cursor);
                    }
                    self.cursor_pos = 0;
                }
                Key::KillToEnd => {
                    let cut = byte_index(&self.query, self.input_cursor);
                    self.query.truncate(cut);
                    self.cursor_pos = 0;
                }
                Key::KillWord => {
                    self.kill_word();
                    self.cursor_pos = 0;
                }

                Key::ToggleMark => {
                    if self.cursor_pos < tries.len() {
                        let path = tries[self.cursor_pos].path.clone();
                        if !self.marked.shift_remove(&path) {
                            self.marked.insert(path);
                            self.delete_mode = true;
                        }
                        if self.marked.is_empty() {
                            self.delete_mode = false;
                        }
                    }
                }

                Key::Cancel => {
                    if self.delete_mode {
                        self.marked.clear();
                        self.delete_mode = false;
                    } else {
                        return Ok(Outcome::Cancelled);
                    }
                }

                Key::Char(c) => {
                    let at = byte_index(&self.query, self.input_cursor);
                    self.query.insert(at, c);
                    self.input_cursor += 1;
                    self.cursor_pos = 0;
                }
            }
        }
    }

    fn remove_query_char(&mut self, char_idx: usize) {
        let start = byte_index(&self.query, char_idx);
        let end = byte_index(&self.query, char_idx + 1);
        self.query.replace_range(start..end, "");
    }

    fn kill_word(&mut self) {
        if self.input_cursor == 0 {
            return;
        }

        let chars: Vec<char> = self.query.chars().collect();
        let mut pos = self.input_cursor as isize - 1;

        while pos >= 0 && !chars[pos as usize].is_alphanumeric() {
            pos -= 1;
        }
        while pos >= 0 && chars[pos as usize].is_alphanumeric() {
            pos -= 1;
        }

        let new_pos = (pos + 1) as usize;
        let mut rebuilt: String = chars[..new_pos].iter().collect();
        rebuilt.extend(&chars[self.input_cursor..]);
        self.query = rebuilt;
        self.input_cursor = new_pos;
    }

    fn create_new_outcome(&self) -> Outcome {
        if self.query.is_empty() {
            return Outcome::Cancelled;
        }

        let name = slugify(&format!("{}-{}", date_prefix(Local::now()), self.query));
        Outcome::CreateNew(self.base_path.join(name))
    }

    /// Runs the delete confirmation sub-flow. Returns `Some` when the loop
    /// should finish with a terminal outcome, `None` to keep browsing.
    fn confirm_batch_delete(&mut self, tries: &[TryDir]) -> Result<Option<Outcome>> {
        let marked_items: Vec<&TryDir> = tries
            .iter()
            .filter(|t| self.marked.contains(&t.path))
            .collect();
        if marked_items.is_empty() {
            return Ok(None);
        }

        self.screen.cls()?;

        let count = marked_items.len();
        let suffix = if count == 1 { "y" } else { "ies" };
        self.screen
            .puts(&format!("{{h2}}Delete {count} Director{suffix}{{reset}}"));
        self.screen.puts("");
        for item in &marked_items {
            self.screen
                .puts(&format!("  {{strike}}{}{{/strike}}", item.name));
        }
        self.screen.puts("");
        self.screen.puts("{b}Type {/b}YES{b} to confirm deletion: {/b}");
        self.screen.flush()?;
        self.screen.show_cursor()?;

        let confirmation = self.read_confirmation()?;
        self.screen.hide_cursor()?;

        if confirmation != "YES" {
            self.delete_status = Some("Delete cancelled".to_string());
            self.marked.clear();
            self.delete_mode = false;
            return Ok(None);
        }

        match self.validate_targets(&marked_items) {
            Ok((targets, base_path)) => {
                let names = targets.iter().map(|t| t.base_name.as_str()).join(", ");
                self.delete_status = Some(format!("Deleted: {{strike}}{names}{{/strike}}"));
                debug!("confirmed deletion of {count} tries");

                // The listing no longer reflects the directory; rescan next time.
                self.all_tries = None;
                self.marked.clear();
                self.delete_mode = false;

                Ok(Some(Outcome::DeleteConfirmed { targets, base_path }))
            }
            Err(e) => {
                self.delete_status = Some(format!("Error: {e}"));
                Ok(None)
            }
        }
    }

    /// Re-resolves every marked path and checks it is a strict descendant of
    /// the resolved base directory. Any violation aborts the whole batch.
    fn validate_targets(&self, marked_items: &[&TryDir]) -> Result<(Vec<DeleteTarget>, PathBuf)> {
        let base_real = self
            .base_path
            .canonicalize()
            .map_err(|e| Error::io_error("tries directory", &self.base_path, e))?;

        let mut validated = Vec::with_capacity(marked_items.len());
        for item in marked_items {
            let target_real = item
                .path
                .canonicalize()
                .map_err(|e| Error::io_error("marked directory", &item.path, e))?;

            if target_real == base_real || !target_real.starts_with(&base_real) {
                return Err(Error::outside_base_path(target_real, base_real));
            }

            validated.push(DeleteTarget {
                path: target_real,
                base_name: item.base_name.clone(),
            });
        }

        Ok((validated, base_real))
    }

    fn read_confirmation(&mut self) -> Result<String> {
        if self.keys.is_scripted() {
            let mut confirmation = String::new();
            loop {
                match self.keys.next_event()? {
                    InputEvent::Key(Key::Confirm | Key::Cancel) => break,
                    InputEvent::Key(Key::Char(c)) => confirmation.push(c),
                    _ => {}
                }
            }
            return Ok(confirmation);
        }

        if let Some(answer) = &self.confirm_override {
            return Ok(answer.clone());
        }
        if !io::stderr().is_tty() {
            return Ok(String::new());
        }

        // Briefly back to cooked mode so line editing works for the answer.
        disable_raw_mode()?;
        let mut line = String::new();
        let read = io::stdin().read_line(&mut line);
        enable_raw_mode()?;
        read?;
        Ok(line.trim().to_string())
    }

    fn render(&mut self, tries: &[TryDir]) -> Result<()> {
        let term_width = self.screen.width() as usize;
        let term_height = self.screen.height() as usize;
        let now = Local::now();

        let separator = "\u{2500}".repeat(term_width.saturating_sub(1));

        self.screen.puts("{h1}\u{1f4c1} Try Selector{reset}");
        self.screen.puts(&format!("{{dim}}{separator}{{/fg}}"));

        // Search input with a reverse-video block at the cursor position.
        let chars: Vec<char> = self.query.chars().collect();
        let before: String = chars[..self.input_cursor.min(chars.len())].iter().collect();
        let at_cursor = chars.get(self.input_cursor).copied().unwrap_or(' ');
        let after: String = chars
            .get(self.input_cursor + 1..)
            .unwrap_or(&[])
            .iter()
            .collect();
        self.screen.puts(&format!(
            "{{dim}}Search:{{/fg}} {{b}}{before}\x1b[7m{at_cursor}\x1b[27m{after}{{/b}}"
        ));
        self.screen.puts(&format!("{{dim}}{separator}{{/fg}}"));

        let max_visible = term_height.saturating_sub(8).max(3);
        let show_create_new = !self.query.is_empty();
        let total_items = tries.len() + usize::from(show_create_new);

        if self.cursor_pos < self.scroll_offset {
            self.scroll_offset = self.cursor_pos;
        } else if self.cursor_pos >= self.scroll_offset + max_visible {
            self.scroll_offset = self.cursor_pos - max_visible + 1;
        }

        let visible_end = (self.scroll_offset + max_visible).min(total_items);

        for idx in self.scroll_offset..visible_end {
            if idx == tries.len() && !tries.is_empty() {
                self.screen.puts("");
            }

            let is_selected = idx == self.cursor_pos;
            self.screen
                .print(if is_selected { "{b}\u{2192} {/b}" } else { "  " });

            if let Some(try_dir) = tries.get(idx) {
                self.render_try_row(try_dir, is_selected, term_width, now);
            } else {
                self.render_create_new_row(is_selected, term_width, now);
            }

            self.screen.puts("");
        }

        if total_items > max_visible {
            self.screen.puts(&format!("{{dim}}{separator}{{/fg}}"));
            self.screen.puts(&format!(
                "{{dim}}[{}-{}/{}]{{/fg}}",
                self.scroll_offset + 1,
                visible_end,
                total_items
            ));
        }

        self.screen.puts(&format!("{{dim}}{separator}{{/fg}}"));

        if let Some(status) = self.delete_status.take() {
            self.screen.puts(&format!("{{b}}{status}{{/b}}"));
        } else if self.delete_mode {
            self.screen.puts(&format!(
                "{{strike}} DELETE MODE {{/strike}} {} marked  |  Ctrl-D: Toggle  Enter: Confirm  Esc: Cancel",
                self.marked.len()
            ));
        } else {
            self.screen
                .puts("{dim}\u{2191}\u{2193}: Navigate  Enter: Select  Ctrl-D: Delete  Esc: Cancel{/fg}");
        }

        self.screen.flush()
    }

    fn render_try_row(
        &mut self,
        try_dir: &TryDir,
        is_selected: bool,
        term_width: usize,
        now: DateTime<Local>,
    ) {
        let is_marked = self.marked.contains(&try_dir.path);
        let base_name = &try_dir.base_name;

        let time_text = format_relative_time(try_dir.modified, now);
        let meta_text = format!("{time_text}, {:.1}", try_dir.score);
        let meta_width = meta_text.chars().count() + 1;

        let prefix_width = 5usize;
        let meta_start = term_width.saturating_sub(meta_width);
        let max_name_for_meta = meta_start.saturating_sub(prefix_width + 1);
        let max_name_width = term_width.saturating_sub(prefix_width + 1);

        if is_marked {
            self.screen.print("{strike}");
        }
        self.screen
            .print(if is_marked { "\u{1f5d1}\u{fe0f}  " } else { "\u{1f4c1} " });
        if is_selected {
            self.screen.print("{section}");
        }

        let display_text = if fuzzy::has_date_prefix(base_name) {
            let date_part = &base_name[..10];
            let mut name_part = base_name[11..].to_string();

            let full_len = base_name.chars().count();
            if full_len > max_name_width && max_name_width > 14 {
                let available = max_name_width - 11 - 2;
                if name_part.chars().count() > available + 1 {
                    name_part = truncate_chars(&name_part, available);
                    name_part.push('\u{2026}');
                }
            }
            let full_name = format!("{date_part}-{name_part}");

            self.screen.print(&format!("{{dim}}{date_part}{{/fg}}"));

            let sep_matches = !self.query.is_empty() && self.query.contains('-');
            self.screen
                .print(if sep_matches { "{b}-{/b}" } else { "{dim}-{/fg}" });

            if self.query.is_empty() {
                self.screen.print(&name_part);
            } else {
                let highlighted = highlight_matches(&name_part, &self.query);
                self.screen.print(&highlighted);
            }

            full_name
        } else {
            let mut name = base_name.clone();
            if name.chars().count() > max_name_width && max_name_width > 2 {
                name = truncate_chars(&name, max_name_width - 1);
                name.push('\u{2026}');
            }

            if self.query.is_empty() {
                self.screen.print(&name);
            } else {
                let highlighted = highlight_matches(&name, &self.query);
                self.screen.print(&highlighted);
            }

            name
        };

        if is_selected {
            self.screen.print("{/section}");
        }

        let display_len = display_text.chars().count();
        if display_len <= max_name_for_meta {
            let padding = meta_start.saturating_sub(prefix_width + display_len);
            self.screen.print(&" ".repeat(padding));
            self.screen.print(&format!("{{dim}}{meta_text}{{/fg}}"));
        }

        if is_marked {
            self.screen.print("{/strike}");
        }
    }

    fn render_create_new_row(&mut self, is_selected: bool, term_width: usize, now: DateTime<Local>) {
        if is_selected {
            self.screen.print("{section}");
        }

        let display = format!(
            "\u{1f4c2} Create new: {}-{}",
            date_prefix(now),
            self.query
        );
        self.screen.print(&display);

        let padding = term_width
            .saturating_sub(3 + display.chars().count())
            .max(1);
        self.screen.print(&" ".repeat(padding));
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(b, _)| b)
}

/// Formats a timestamp as a short relative age ("5m ago", "2d ago").
fn format_relative_time(time: Option<DateTime<Local>>, now: DateTime<Local>) -> String {
    let Some(time) = time else {
        return "?".to_string();
    };

    let seconds = (now - time).num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if seconds < 60 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        format!("{}w ago", days / 7)
    }
}
