//! Path handling for log exports
//!
//! Exports escape non-ASCII path bytes as `\` followed by a short hex code
//! and may wrap the whole path in double quotes. Everything downstream
//! (identity tracking, coupling, the contribution cache) compares paths as
//! strings, so every path is decoded here before it is stored anywhere.

use crate::error::ParseError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static ESCAPE: OnceLock<Regex> = OnceLock::new();

/// `\` followed by a 2-3 character hex code. Greedy: three characters are
/// taken when all three are valid class members, two otherwise.
fn escape_pattern() -> &'static Regex {
    ESCAPE.get_or_init(|| Regex::new(r"\\([0-9a-zA-Z]{2,3})").expect("escape pattern compiles"))
}

/// Decode an escaped path: substitute each `\HH`/`\HHH` escape with the
/// character it encodes, then strip one layer of surrounding double quotes.
///
/// Idempotent on strings containing no escapes or quotes. A matched escape
/// whose code is not valid hexadecimal fails the parse.
pub fn decode_path(escaped: &str) -> Result<String, ParseError> {
    let invalid = || ParseError::InvalidPathEscape {
        path: escaped.to_string(),
    };

    let mut decoded = String::with_capacity(escaped.len());
    let mut tail = 0;
    for captures in escape_pattern().captures_iter(escaped) {
        let whole = captures.get(0).ok_or_else(invalid)?;
        let code = u32::from_str_radix(&captures[1], 16).map_err(|_| invalid())?;
        // At most 3 hex digits, so the code stays below the surrogate range
        let ch = char::from_u32(code).ok_or_else(invalid)?;
        decoded.push_str(&escaped[tail..whole.start()]);
        decoded.push(ch);
        tail = whole.end();
    }
    decoded.push_str(&escaped[tail..]);

    Ok(strip_quotes(&decoded).to_string())
}

/// Map a decoded server-relative path to its location under the project root.
pub fn map_to_local(project_base: &Path, server_path: &str) -> PathBuf {
    project_base.join(server_path.trim_start_matches('/'))
}

fn strip_quotes(path: &str) -> &str {
    if path.len() >= 2 && path.starts_with('"') && path.ends_with('"') {
        &path[1..path.len() - 1]
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_is_unchanged() {
        assert_eq!(decode_path("src/main.rs").unwrap(), "src/main.rs");
        // Idempotent: decoding twice is the same as decoding once
        let once = decode_path("src/lib.rs").unwrap();
        assert_eq!(decode_path(&once).unwrap(), once);
    }

    #[test]
    fn test_two_digit_escapes() {
        assert_eq!(decode_path(r"\41\42").unwrap(), "AB");
    }

    #[test]
    fn test_three_digit_escape() {
        // 0x30a is a combining ring, well past ASCII
        assert_eq!(decode_path(r"docs/a\30a.md").unwrap(), "docs/a\u{30a}.md");
    }

    #[test]
    fn test_surrounding_quotes_are_stripped_once() {
        assert_eq!(decode_path("\"src/main.rs\"").unwrap(), "src/main.rs");
        assert_eq!(decode_path("\"\"quoted\"\"").unwrap(), "\"quoted\"");
    }

    #[test]
    fn test_lone_quote_is_kept() {
        assert_eq!(decode_path("\"").unwrap(), "\"");
        assert_eq!(decode_path("a\"b").unwrap(), "a\"b");
    }

    #[test]
    fn test_invalid_hex_fails() {
        let err = decode_path(r"src/\zzz.rs").unwrap_err();
        assert!(matches!(err, ParseError::InvalidPathEscape { .. }));
    }

    #[test]
    fn test_escape_followed_by_plain_text() {
        // "41x" is three class characters but not valid hex
        let err = decode_path(r"\41x").unwrap_err();
        assert!(matches!(err, ParseError::InvalidPathEscape { .. }));
        // Two-character codes close on the next backslash or non-class byte
        assert_eq!(decode_path(r"\41\42.rs").unwrap(), "AB.rs");
    }

    #[test]
    fn test_map_to_local_joins_under_base() {
        let base = Path::new("/work/project");
        assert_eq!(
            map_to_local(base, "src/main.rs"),
            PathBuf::from("/work/project/src/main.rs")
        );
        assert_eq!(
            map_to_local(base, "/rooted.rs"),
            PathBuf::from("/work/project/rooted.rs")
        );
    }
}
