//! Phase 2: Value Parser
//!
//! The value parser walks the token stream by explicit cursor. Each function
//! takes the index of the token to start at and returns the value it built
//! together with the index of the first token it did not consume.
//!
//! - `parse_block` decides between a sequence and a mapping
//! - `parse_map` reads `key: value` entries at one indent
//! - `parse_list` reads `- ...` items at one indent
//!
//! `parse_block` is the point of mutual recursion; every call into it counts
//! one level of nesting against the configured maximum depth.

use crate::error::{ParseContext, ParseError, Result};
use crate::scalar::coerce;
use crate::scanner::Token;
use crate::value::{Mapping, Value};

/// Parse the root of a brief document.
///
/// An empty document (no significant lines) is an empty mapping. Any other
/// shape is returned as-is; requiring a mapping is up to the caller.
pub fn parse_root(tokens: &[Token], ctx: &ParseContext) -> Result<Value> {
    let first = match tokens.first() {
        Some(t) => t,
        None => return Ok(Value::Mapping(Mapping::new())),
    };

    let (value, next) = parse_block(tokens, 0, first.indent, 1, ctx)?;
    ensure_at_end(value, tokens, next)
}

/// Verify no content remains after parsing.
fn ensure_at_end(value: Value, tokens: &[Token], i: usize) -> Result<Value> {
    match tokens.get(i) {
        Some(t) => Err(ParseError::UnexpectedContent { line: t.line }),
        None => Ok(value),
    }
}

/// Whether the token at `i` exists and is indented past `indent`.
fn deeper_than(tokens: &[Token], i: usize, indent: usize) -> Option<&Token> {
    tokens.get(i).filter(|t| t.indent > indent)
}

/// Split `s` at its first colon, trimming the key.
fn split_key(s: &str) -> Option<(&str, &str)> {
    s.split_once(':').map(|(key, rest)| (key.trim(), rest))
}

// ============================================================================
// Block Dispatch
// ============================================================================

/// Parse the block starting at `i`, which must sit at `indent`.
pub fn parse_block(
    tokens: &[Token],
    i: usize,
    indent: usize,
    depth: usize,
    ctx: &ParseContext,
) -> Result<(Value, usize)> {
    let t = match tokens.get(i) {
        Some(t) => t,
        None => {
            let line = tokens.last().map_or(0, |t| t.line);
            return Err(ParseError::UnexpectedEndOfInput { line });
        }
    };

    if depth > ctx.max_depth {
        return Err(ParseError::NestingTooDeep {
            max: ctx.max_depth,
            line: t.line,
        });
    }

    if t.indent != indent {
        return Err(ParseError::UnexpectedIndentation { line: t.line });
    }

    if t.is_list_item() {
        let (items, next) = parse_list(tokens, i, indent, depth, ctx)?;
        Ok((Value::Sequence(items), next))
    } else {
        let (map, next) = parse_map(tokens, i, indent, depth, ctx)?;
        Ok((Value::Mapping(map), next))
    }
}

/// Parse the value deferred to the block after a `key:` or bare `-`.
///
/// `i` points just past the line that deferred its value. The value is
/// `Null` when nothing more indented follows.
fn parse_deferred(
    tokens: &[Token],
    i: usize,
    indent: usize,
    depth: usize,
    ctx: &ParseContext,
) -> Result<(Value, usize)> {
    match deeper_than(tokens, i, indent) {
        Some(next) => parse_block(tokens, i, next.indent, depth + 1, ctx),
        None => Ok((Value::Null, i)),
    }
}

// ============================================================================
// Mapping Parsing
// ============================================================================

/// Parse consecutive `key: value` entries at exactly `indent`.
///
/// A repeated key replaces the earlier value.
pub fn parse_map(
    tokens: &[Token],
    mut i: usize,
    indent: usize,
    depth: usize,
    ctx: &ParseContext,
) -> Result<(Mapping, usize)> {
    let mut map = Mapping::new();

    while let Some(t) = tokens.get(i).filter(|t| t.indent == indent) {
        if t.is_list_item() {
            return Err(ParseError::UnexpectedListItem { line: t.line });
        }

        let (key, rest) =
            split_key(&t.content).ok_or(ParseError::MissingColon { line: t.line })?;
        let rest = rest.trim_start_matches(' ');
        i += 1;

        let value = if rest.is_empty() {
            let (value, next) = parse_deferred(tokens, i, indent, depth, ctx)?;
            i = next;
            value
        } else {
            coerce(rest)
        };

        map.insert(key.to_string(), value);
    }

    Ok((map, i))
}

// ============================================================================
// Sequence Parsing
// ============================================================================

/// Parse consecutive `- ` items at exactly `indent`.
pub fn parse_list(
    tokens: &[Token],
    mut i: usize,
    indent: usize,
    depth: usize,
    ctx: &ParseContext,
) -> Result<(Vec<Value>, usize)> {
    let mut items = Vec::new();

    while let Some(t) = tokens.get(i).filter(|t| t.indent == indent) {
        if !t.is_list_item() {
            break;
        }

        let body = t.list_body();
        i += 1;

        let item = if body.is_empty() {
            let (value, next) = parse_deferred(tokens, i, indent, depth, ctx)?;
            i = next;
            value
        } else if let Some((key, rest)) = split_key(body) {
            let (map, next) = parse_inline_mapping(tokens, i, t, key, rest, depth, ctx)?;
            i = next;
            Value::Mapping(map)
        } else {
            coerce(body.trim())
        };

        items.push(item);
    }

    Ok((items, i))
}

/// Build the mapping for a `- key: ...` item.
///
/// The first key comes from the item line itself. Any lines after it that
/// are indented past the item's marker hold further keys of the same
/// mapping, so a list item among them is an unexpected list item.
fn parse_inline_mapping(
    tokens: &[Token],
    mut i: usize,
    item: &Token,
    key: &str,
    rest: &str,
    depth: usize,
    ctx: &ParseContext,
) -> Result<(Mapping, usize)> {
    let mut map = Mapping::new();

    let rest = rest.trim();
    let value = if rest.is_empty() {
        let (value, next) = parse_deferred(tokens, i, item.indent, depth, ctx)?;
        i = next;
        value
    } else {
        coerce(rest)
    };
    map.insert(key.to_string(), value);

    if let Some(next) = deeper_than(tokens, i, item.indent) {
        if depth + 1 > ctx.max_depth {
            return Err(ParseError::NestingTooDeep {
                max: ctx.max_depth,
                line: next.line,
            });
        }
        let (siblings, after) = parse_map(tokens, i, next.indent, depth + 1, ctx)?;
        map.extend(siblings);
        i = after;
    }

    Ok((map, i))
}
