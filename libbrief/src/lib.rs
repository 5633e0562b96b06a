//! Parser for the indentation-sensitive YAML subset used by briefs.
//!
//! A brief is plain configuration: nested mappings and sequences of
//! scalars, with indentation made of spaces only. Anchors, tags, flow
//! collections, block scalars and multi-document streams are not part of
//! the format.
//!
//! # Parsing Pipeline
//!
//! 1. **Scanner**: Converts source text into tokens, one per significant
//!    line, rejecting tabs and dropping blank and comment-only lines.
//!
//! 2. **Value Parser**: Recursively walks the tokens by explicit cursor,
//!    building mappings and sequences and coercing scalars.
//!
//! Parsing is strict about structure and lenient about scalars: any
//! misplaced line is an error carrying its line number, while a scalar
//! that looks like nothing in particular is kept as a string.

mod error;
mod parser;
mod scalar;
mod scanner;
mod value;

pub use error::{ParseError, ParseOptions, Result, DEFAULT_MAX_DEPTH};
pub use scalar::{coerce, strip_comment};
pub use scanner::{scan, Token};
pub use value::{Mapping, Value};

/// Parse a brief document from a string.
///
/// # Example
///
/// ```
/// use libbrief::{parse, Value};
///
/// let value = parse("system:\n  version: 2\n").unwrap();
/// assert_eq!(value.get("system").and_then(|s| s.get("version")), Some(&Value::from(2)));
/// ```
pub fn parse(input: &str) -> Result<Value> {
    parse_with_options(input, &ParseOptions::default())
}

/// Parse a brief document from a string with explicit options.
pub fn parse_with_options(input: &str, options: &ParseOptions) -> Result<Value> {
    let ctx = error::ParseContext::new(options);

    // Phase 1: Scan source into tokens
    let tokens = scanner::scan(input)?;

    // Phase 2: Parse tokens into value
    parser::parse_root(&tokens, &ctx)
}
