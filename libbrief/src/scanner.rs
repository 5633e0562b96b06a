//! Phase 1: Scanner
//!
//! The scanner converts raw source text into tokens, one per significant
//! line. It performs:
//! - Tab rejection (on every line, including comments and blank lines)
//! - Blank and comment-only line filtering
//! - Indentation counting

use crate::error::{ParseError, Result};

/// A single significant source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Number of leading spaces.
    pub indent: usize,
    /// Content after the indent, with trailing whitespace removed.
    pub content: String,
    /// One-based line number for error reporting.
    pub line: usize,
}

impl Token {
    /// Whether this line opens a sequence item.
    ///
    /// Trailing whitespace is already gone, so an item with an empty body
    /// shows up as a bare `-`.
    pub fn is_list_item(&self) -> bool {
        self.content == "-" || self.content.starts_with("- ")
    }

    /// The content after the `- ` marker. Empty for a bare `-`.
    pub fn list_body(&self) -> &str {
        self.content.get(2..).unwrap_or("")
    }
}

/// Scan source text into tokens.
pub fn scan(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;

        if raw.contains('\t') {
            return Err(ParseError::TabsNotSupported { line });
        }

        if raw.trim().is_empty() {
            continue;
        }

        let indent = count_indent(raw);
        let rest = &raw[indent..];

        // Whole-line comments produce nothing
        if rest.starts_with('#') {
            continue;
        }

        tokens.push(Token {
            indent,
            content: rest.trim_end().to_string(),
            line,
        });
    }

    Ok(tokens)
}

/// Count the number of leading spaces in a line.
fn count_indent(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}
