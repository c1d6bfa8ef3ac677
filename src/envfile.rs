//! Ordered `KEY=VALUE` document model for dotenv-style files.
//!
//! Parsing keeps every line: assignments become [`Line::Pair`], everything
//! else (comments, blanks, malformed content) is preserved verbatim as
//! [`Line::Raw`]. Serialization round-trips untouched input byte-for-byte,
//! so editing one key never reformats the rest of the file.

use std::fmt;

/// One line of a dotenv-style file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A `KEY=VALUE` assignment, split at the first `=`.
    Pair { key: String, value: String },
    /// Any other line, kept verbatim.
    Raw(String),
}

/// An ordered dotenv-style document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFile {
    lines: Vec<Line>,
    trailing_newline: bool,
}

impl Default for EnvFile {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvFile {
    /// Create an empty document.
    pub fn new() -> Self {
        EnvFile {
            lines: Vec::new(),
            trailing_newline: true,
        }
    }

    /// Parse a document, tolerating any content.
    ///
    /// A line is an assignment only when the text before the first `=` is a
    /// valid key (`[A-Za-z_][A-Za-z0-9_]*` with no surrounding whitespace);
    /// everything else is kept as a raw line.
    pub fn parse(content: &str) -> Self {
        if content.is_empty() {
            return EnvFile::new();
        }
        let trailing_newline = content.ends_with('\n');
        let mut pieces: Vec<&str> = content.split('\n').collect();
        if trailing_newline {
            pieces.pop();
        }
        let lines = pieces.into_iter().map(parse_line).collect();
        EnvFile {
            lines,
            trailing_newline,
        }
    }

    /// Look up the value of the first assignment of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            Line::Pair { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Set `key` to `value`: updates the first existing assignment in
    /// place, or appends a new one if the key is absent.
    pub fn set(&mut self, key: &str, value: &str) {
        for line in &mut self.lines {
            if let Line::Pair { key: k, value: v } = line {
                if k == key {
                    *v = value.to_string();
                    return;
                }
            }
        }
        self.lines.push(Line::Pair {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// All lines in document order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Keys of every assignment, in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            Line::Pair { key, .. } => Some(key.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for EnvFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            match line {
                Line::Pair { key, value } => write!(f, "{key}={value}")?,
                Line::Raw(raw) => f.write_str(raw)?,
            }
        }
        if !self.lines.is_empty() && self.trailing_newline {
            f.write_str("\n")?;
        }
        Ok(())
    }
}

fn parse_line(raw: &str) -> Line {
    if let Some(idx) = raw.find('=') {
        let key = &raw[..idx];
        if is_valid_key(key) {
            return Line::Pair {
                key: key.to_string(),
                value: raw[idx + 1..].to_string(),
            };
        }
    }
    Line::Raw(raw.to_string())
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
