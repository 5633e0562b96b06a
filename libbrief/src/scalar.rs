//! Scalar coercion.
//!
//! Scalars are lenient: a fragment that fails to look like a boolean, null,
//! integer or quoted string falls through to a plain string. Coercion never
//! fails.

use crate::value::Value;
use num_bigint::BigInt;

/// Remove a trailing `#` comment that is not inside quotes.
///
/// A quote character always toggles its own state unless the other kind of
/// quote is open. Backslash escapes are not recognized, so `"a\"#b"` ends
/// its quoted run at the second `"`.
pub fn strip_comment(s: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;

    for (i, c) in s.char_indices() {
        if c == '\'' && !in_double {
            in_single = !in_single;
        } else if c == '"' && !in_single {
            in_double = !in_double;
        } else if c == '#' && !in_single && !in_double {
            return s[..i].trim_end();
        }
    }
    s.trim()
}

/// Convert a value fragment into its most specific scalar.
pub fn coerce(s: &str) -> Value {
    let s = strip_comment(s);
    if s.is_empty() {
        return Value::String(String::new());
    }

    if let Some(b) = parse_bool(s) {
        return Value::Bool(b);
    }

    if s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("none") {
        return Value::Null;
    }

    if is_integer_pattern(s) {
        return match s.parse::<BigInt>() {
            Ok(n) => Value::Integer(n),
            Err(_) => Value::String(s.to_string()),
        };
    }

    if let Some(inner) = unquote(s) {
        return Value::String(inner.to_string());
    }

    Value::String(s.to_string())
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Check if string matches integer pattern: -?\d+
fn is_integer_pattern(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// The text between the outer quotes, taken verbatim.
///
/// A lone quote character both starts and ends with the quote, so it
/// unwraps to the empty string.
fn unquote(s: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|quote| {
        if s.starts_with(quote) && s.ends_with(quote) {
            Some(s.get(1..s.len() - 1).unwrap_or(""))
        } else {
            None
        }
    })
}
