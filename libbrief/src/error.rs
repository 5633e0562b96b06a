//! Error types for brief parsing.

use thiserror::Error;

/// Result type for brief parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Nesting depth allowed when no other limit is configured.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options controlling a parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest block nesting accepted before failing with
    /// [`ParseError::NestingTooDeep`]. The top-level block is depth 1.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Replace the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Parse context threaded through the descent.
#[derive(Clone, Debug)]
pub(crate) struct ParseContext {
    pub(crate) max_depth: usize,
}

impl ParseContext {
    pub(crate) fn new(options: &ParseOptions) -> Self {
        Self {
            max_depth: options.max_depth,
        }
    }
}

/// Structural error raised while reading a brief.
///
/// Every variant carries the 1-based source line it refers to, and the
/// rendered message embeds that line number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A line contains a tab character.
    #[error("Tabs are not supported in YAML (line {line}).")]
    TabsNotSupported { line: usize },

    /// A block was requested past the last token.
    #[error("Unexpected end of input after line {line}.")]
    UnexpectedEndOfInput { line: usize },

    /// A token does not sit at the indent its block expects.
    #[error("Unexpected indentation at line {line}.")]
    UnexpectedIndentation { line: usize },

    /// A `- ` item appeared inside a mapping.
    #[error("Unexpected list item at line {line}.")]
    UnexpectedListItem { line: usize },

    /// A mapping entry has no `:`.
    #[error("Missing ':' in mapping at line {line}.")]
    MissingColon { line: usize },

    /// The deeper lines continuing a list item did not yield a mapping.
    /// A list item among them is reported as [`ParseError::UnexpectedListItem`].
    #[error("Expected mapping for list item at line {line}.")]
    ExpectedMappingForContinuation { line: usize },

    /// Tokens remain after the top-level block ended.
    #[error("Unexpected content at line {line}.")]
    UnexpectedContent { line: usize },

    /// Blocks nest deeper than the configured limit.
    #[error("Nesting exceeds maximum depth of {max} at line {line}.")]
    NestingTooDeep { max: usize, line: usize },
}

impl ParseError {
    /// The 1-based source line the error points at.
    pub fn line(&self) -> usize {
        match *self {
            ParseError::TabsNotSupported { line }
            | ParseError::UnexpectedEndOfInput { line }
            | ParseError::UnexpectedIndentation { line }
            | ParseError::UnexpectedListItem { line }
            | ParseError::MissingColon { line }
            | ParseError::ExpectedMappingForContinuation { line }
            | ParseError::UnexpectedContent { line }
            | ParseError::NestingTooDeep { line, .. } => line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_embed_line() {
        let err = ParseError::TabsNotSupported { line: 3 };
        assert_eq!(err.to_string(), "Tabs are not supported in YAML (line 3).");
        assert_eq!(err.line(), 3);

        let err = ParseError::MissingColon { line: 7 };
        assert_eq!(err.to_string(), "Missing ':' in mapping at line 7.");

        let err = ParseError::NestingTooDeep { max: 4, line: 9 };
        assert_eq!(
            err.to_string(),
            "Nesting exceeds maximum depth of 4 at line 9."
        );
        assert_eq!(err.line(), 9);
    }

    #[test]
    fn test_default_options() {
        assert_eq!(ParseOptions::default().max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(ParseOptions::default().with_max_depth(2).max_depth, 2);
    }
}
