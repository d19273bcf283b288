//! Parser for the line-oriented `.properties` text format.
//!
//! Supported syntax:
//! - `#` and `!` comment lines, blank lines.
//! - `key=value`, `key: value` and `key value` separators.
//! - Backslash line continuation (leading whitespace of the next line is dropped).
//! - Escapes `\t`, `\n`, `\r`, `\f`, `\uXXXX`; any other escaped char stands for itself.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, PartialEq, Eq)]
pub(super) struct ParseError {
    pub line: usize,
    pub message: String,
}

/// Parse `text` into key/value pairs in file order. Duplicate keys are
/// returned as-is; the caller decides precedence.
pub(super) fn parse_properties(text: &str) -> Result<Vec<(String, String)>, ParseError> {
    let mut pairs = Vec::new();
    let mut lines = text.lines().enumerate();

    while let Some((index, raw)) = lines.next() {
        let first_line = index + 1;
        let trimmed = raw.trim_start_matches(is_blank);
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = String::from(trimmed);
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }

        let pair = parse_logical_line(&logical).map_err(|message| ParseError {
            line: first_line,
            message,
        })?;
        pairs.push(pair);
    }

    Ok(pairs)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// An odd number of trailing backslashes means the last one escapes the newline.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn parse_logical_line(line: &str) -> Result<(String, String), String> {
    let mut chars = line.chars().peekable();
    let mut key = String::new();
    let mut separator_seen = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(unescaped) = read_escape(&mut chars)? {
                    key.push(unescaped);
                }
            }
            '=' | ':' => {
                separator_seen = true;
                break;
            }
            c if is_blank(c) => break,
            c => key.push(c),
        }
    }

    skip_blanks(&mut chars);
    if !separator_seen && matches!(chars.peek(), Some('=') | Some(':')) {
        chars.next();
        skip_blanks(&mut chars);
    }

    let mut value = String::new();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(unescaped) = read_escape(&mut chars)? {
                value.push(unescaped);
            }
        } else {
            value.push(c);
        }
    }

    Ok((key, value))
}

fn skip_blanks(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| is_blank(*c)) {
        chars.next();
    }
}

fn read_escape(chars: &mut Peekable<Chars<'_>>) -> Result<Option<char>, String> {
    let Some(c) = chars.next() else {
        return Ok(None);
    };
    let unescaped = match c {
        't' => '\t',
        'n' => '\n',
        'r' => '\r',
        'f' => '\x0c',
        'u' => {
            let hex: String = chars.by_ref().take(4).collect();
            if hex.len() != 4 {
                return Err("Malformed \\uxxxx encoding".to_string());
            }
            let code = u32::from_str_radix(&hex, 16)
                .map_err(|_| "Malformed \\uxxxx encoding".to_string())?;
            char::from_u32(code).ok_or_else(|| format!("Invalid code point \\u{hex}"))?
        }
        other => other,
    };
    Ok(Some(unescaped))
}
