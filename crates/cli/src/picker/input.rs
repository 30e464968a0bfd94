//! Input events for the picker.
//!
//! Keys arrive either from the live terminal (crossterm's event stream,
//! polled on a short tick so resizes are noticed promptly) or from a scripted
//! list parsed out of `--and-keys` for deterministic runs.

use std::collections::VecDeque;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use tryspace_core::error::Result;

/// How long a blocking read waits before giving the loop a chance to react
/// to anything that arrived out of band.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The picker's key vocabulary. Raw sequences that map to nothing are
/// swallowed by the source, never surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Confirm,
    Up,
    Down,
    CursorLeft,
    CursorRight,
    CursorStart,
    CursorEnd,
    Backspace,
    DeleteForward,
    KillToEnd,
    KillWord,
    ToggleMark,
    Cancel,
    Char(char),
}

/// One iteration's worth of input: either a key or a viewport resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    Resize,
}

/// Source of input events for the selection loop.
pub trait KeySource {
    /// Blocks for the next event.
    fn next_event(&mut self) -> Result<InputEvent>;

    /// True for replayed input, where terminal checks don't apply.
    fn is_scripted(&self) -> bool {
        false
    }
}

/// Characters accepted into the query buffer.
pub fn is_query_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ')
}

/// Live terminal input via crossterm events.
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn next_event(&mut self) -> Result<InputEvent> {
        loop {
            if !event::poll(POLL_INTERVAL)? {
                continue;
            }

            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if let Some(key) = map_key_event(key.code, key.modifiers) {
                        return Ok(InputEvent::Key(key));
                    }
                }
                Event::Resize(_, _) => return Ok(InputEvent::Resize),
                _ => {}
            }
        }
    }
}

fn map_key_event(code: KeyCode, modifiers: KeyModifiers) -> Option<Key> {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);

    match code {
        KeyCode::Enter => Some(Key::Confirm),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::CursorLeft),
        KeyCode::Right => Some(Key::CursorRight),
        KeyCode::Home => Some(Key::CursorStart),
        KeyCode::End => Some(Key::CursorEnd),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Delete => Some(Key::DeleteForward),
        KeyCode::Esc => Some(Key::Cancel),
        KeyCode::Char(c) if ctrl => match c {
            'p' => Some(Key::Up),
            'n' => Some(Key::Down),
            'b' => Some(Key::CursorLeft),
            'f' => Some(Key::CursorRight),
            'a' => Some(Key::CursorStart),
            'e' => Some(Key::CursorEnd),
            'h' => Some(Key::Backspace),
            'k' => Some(Key::KillToEnd),
            'w' => Some(Key::KillWord),
            'd' => Some(Key::ToggleMark),
            'c' => Some(Key::Cancel),
            _ => None,
        },
        KeyCode::Char(c) if is_query_char(c) => Some(Key::Char(c)),
        _ => None,
    }
}

/// Replayed input for scripted runs. An exhausted script yields `Cancel`
/// so the loop always terminates.
pub struct ScriptedKeys {
    keys: VecDeque<Key>,
}

impl ScriptedKeys {
    pub fn new(keys: Vec<Key>) -> Self {
        Self { keys: keys.into() }
    }
}

impl KeySource for ScriptedKeys {
    fn next_event(&mut self) -> Result<InputEvent> {
        Ok(InputEvent::Key(self.keys.pop_front().unwrap_or(Key::Cancel)))
    }

    fn is_scripted(&self) -> bool {
        true
    }
}

fn control_char_key(c: char) -> Option<Key> {
    match c {
        '\r' | '\n' => Some(Key::Confirm),
        '\x7f' | '\x08' => Some(Key::Backspace),
        '\x01' => Some(Key::CursorStart),
        '\x02' => Some(Key::CursorLeft),
        '\x04' => Some(Key::ToggleMark),
        '\x05' => Some(Key::CursorEnd),
        '\x06' => Some(Key::CursorRight),
        '\x0b' => Some(Key::KillToEnd),
        '\x0e' => Some(Key::Down),
        '\x10' => Some(Key::Up),
        '\x17' => Some(Key::KillWord),
        '\x03' => Some(Key::Cancel),
        _ => None,
    }
}

fn named_key(name: &str) -> Option<Key> {
    match name {
        "UP" => Some(Key::Up),
        "DOWN" => Some(Key::Down),
        "LEFT" => Some(Key::CursorLeft),
        "RIGHT" => Some(Key::CursorRight),
        "ENTER" => Some(Key::Confirm),
        "ESC" => Some(Key::Cancel),
        "BACKSPACE" => Some(Key::Backspace),
        "DELETE" => Some(Key::DeleteForward),
        "CTRL-A" | "CTRLA" => Some(Key::CursorStart),
        "CTRL-B" | "CTRLB" => Some(Key::CursorLeft),
        "CTRL-D" | "CTRLD" => Some(Key::ToggleMark),
        "CTRL-E" | "CTRLE" => Some(Key::CursorEnd),
        "CTRL-F" | "CTRLF" => Some(Key::CursorRight),
        "CTRL-H" | "CTRLH" => Some(Key::Backspace),
        "CTRL-K" | "CTRLK" => Some(Key::KillToEnd),
        "CTRL-N" | "CTRLN" => Some(Key::Down),
        "CTRL-P" | "CTRLP" => Some(Key::Up),
        "CTRL-W" | "CTRLW" => Some(Key::KillWord),
        _ => None,
    }
}

/// Parses an `--and-keys` specification.
///
/// Comma-separated uppercase tokens (`UP,DOWN,ENTER,TYPE=foo,CTRL-D`) are the
/// readable form; anything else is taken as a raw character string where
/// escape sequences (`\x1b[A`) and control characters mean the usual keys.
pub fn parse_key_spec(spec: &str) -> Vec<Key> {
    let token_mode = spec.contains(',')
        || (!spec.is_empty() && spec.chars().all(|c| c.is_ascii_uppercase() || c == '-'));

    if token_mode {
        let mut keys = Vec::new();
        for token in spec.split(',') {
            let token = token.trim();
            let upper = token.to_uppercase();

            if let Some(key) = named_key(&upper) {
                keys.push(key);
            } else if let Some(text) = token
                .strip_prefix("TYPE=")
                .or_else(|| token.strip_prefix("type="))
            {
                keys.extend(text.chars().map(Key::Char));
            } else if token.chars().count() == 1 {
                if let Some(c) = token.chars().next() {
                    keys.push(Key::Char(c));
                }
            }
        }
        return keys;
    }

    let mut keys = Vec::new();
    let chars: Vec<char> = spec.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '\x1b' && i + 2 < chars.len() && chars[i + 1] == '[' {
            match chars[i + 2] {
                'A' => keys.push(Key::Up),
                'B' => keys.push(Key::Down),
                'C' => keys.push(Key::CursorRight),
                'D' => keys.push(Key::CursorLeft),
                _ => {}
            }
            i += 3;
        } else if chars[i] == '\x1b' {
            keys.push(Key::Cancel);
            i += 1;
        } else if let Some(key) = control_char_key(chars[i]) {
            keys.push(key);
            i += 1;
        } else {
            if is_query_char(chars[i]) {
                keys.push(Key::Char(chars[i]));
            }
            i += 1;
        }
    }

    keys
}
