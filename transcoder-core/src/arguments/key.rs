//! Argument keys and rendered command-line tokens.

use std::borrow::Cow;
use std::fmt;

/// Name of a `transcode-video` option.
///
/// Single-character names render as short flags (`-E`), everything else as a
/// long flag (`--add-audio`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArgumentKey(&'static str);

impl ArgumentKey {
    /// Creates a key from the option's bare name (without leading dashes).
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The bare option name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0
    }

    /// The option name as it appears on the command line.
    #[must_use]
    pub fn flag(&self) -> String {
        if self.0.chars().count() == 1 {
            format!("-{}", self.0)
        } else {
            format!("--{}", self.0)
        }
    }
}

impl fmt::Display for ArgumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flag())
    }
}

/// One rendered command-line argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A bare flag such as `--dry-run`.
    Flag(ArgumentKey),
    /// A `--name=value` assignment. The value is stored unquoted.
    Assignment { key: ArgumentKey, value: String },
}

impl Token {
    /// The key this token was emitted for.
    #[must_use]
    pub fn key(&self) -> ArgumentKey {
        match self {
            Token::Flag(key) | Token::Assignment { key, .. } => *key,
        }
    }

    /// The unquoted value, if this is an assignment.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Token::Flag(_) => None,
            Token::Assignment { value, .. } => Some(value),
        }
    }

    /// Renders the token exactly as it is passed to the tool.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Token::Flag(key) => key.flag(),
            Token::Assignment { key, value } => format!("{}={}", key.flag(), quote_value(value)),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Wraps a value containing a space in double quotes.
///
/// No escaping is done: embedded quotes are passed through as-is, which is
/// what `transcode-video` expects.
#[must_use]
pub fn quote_value(value: &str) -> Cow<'_, str> {
    if value.contains(' ') {
        Cow::Owned(format!("\"{value}\""))
    } else {
        Cow::Borrowed(value)
    }
}
