//! Inline style tokens and their ANSI expansion.
//!
//! All user-facing text is composed with a small closed vocabulary of tokens
//! (`{b}`, `{dim}`, `{h1}`, ...) so that the same strings can be expanded to
//! ANSI escapes on a terminal or stripped to plain text everywhere else.

/// Token to ANSI escape mapping.
///
/// Bold-yellow (`{b}`) marks fuzzy-match characters, `{section}` is the
/// highlighted row background, `{strike}` the marked-for-deletion background.
pub const TOKEN_MAP: &[(&str, &str)] = &[
    ("{b}", "\x1b[1;33m"),
    ("{/b}", "\x1b[22m\x1b[39m"),
    ("{dim}", "\x1b[90m"),
    ("{text}", "\x1b[0m\x1b[39m"),
    ("{reset}", "\x1b[0m\x1b[39m\x1b[49m"),
    ("{/fg}", "\x1b[39m"),
    ("{h1}", "\x1b[1;38;5;208m"),
    ("{h2}", "\x1b[1;34m"),
    ("{section}", "\x1b[1m\x1b[48;5;236m"),
    ("{/section}", "\x1b[0m"),
    ("{strike}", "\x1b[48;5;52m"),
    ("{/strike}", "\x1b[49m"),
    ("{cursor}", "\x1b[7m \x1b[27m"),
];

fn lookup(token: &str) -> Option<&'static str> {
    TOKEN_MAP
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, ansi)| *ansi)
}

/// Expands every known token in `text` to its ANSI sequence.
///
/// Unknown `{...}` runs are left untouched so literal braces in directory
/// names survive.
pub fn expand_tokens(text: &str) -> String {
    transform_tokens(text, |token| lookup(token).map(String::from))
}

/// Removes every `{...}` run from `text`, leaving plain text.
pub fn strip_tokens(text: &str) -> String {
    transform_tokens(text, |_| Some(String::new()))
}

fn transform_tokens(text: &str, replace: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        rest = &rest[open..];

        match rest.find('}') {
            Some(close) => {
                let token = &rest[..=close];
                match replace(token) {
                    Some(replacement) => out.push_str(&replacement),
                    None => out.push_str(token),
                }
                rest = &rest[close + 1..];
            }
            None => break,
        }
    }

    out.push_str(rest);
    out
}
