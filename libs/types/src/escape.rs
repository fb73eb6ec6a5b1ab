//! # Literal Escaping
//!
//! The single escaping format shared by everything that embeds bytes in
//! specification text: literal specs, frozen values, nested messages and log
//! records. Encoding followed by decoding is lossless for any byte sequence.
//!
//! ```text
//! bytes ──bytes_to_escaped_str──▶ printable text ──escaped_str_to_bytes──▶ bytes
//!   \\ → "\\\\"    \n \r \t → "\\n" "\\r" "\\t"    0x20..=0x7e → as-is
//!   '  → "\\'" (opt-in)                            others → "\\xhh"
//! ```

use crate::error::{EscapeError, EscapeResult};
use std::fmt::Write;

/// Render bytes as printable, backslash-escaped text
///
/// `keep_spacing` leaves tabs, newlines and carriage returns unescaped.
/// `escape_single_quotes` turns `'` into `\'`.
pub fn bytes_to_escaped_str(data: &[u8], keep_spacing: bool, escape_single_quotes: bool) -> String {
    let mut out = String::with_capacity(data.len());
    for &b in data {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' if escape_single_quotes => out.push_str("\\'"),
            b'\t' | b'\n' | b'\r' if keep_spacing => out.push(b as char),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            0x20..=0x7e => out.push(b as char),
            _ => {
                // Writing to a String cannot fail
                let _ = write!(out, "\\x{:02x}", b);
            }
        }
    }
    out
}

/// Decode backslash-escaped text back into bytes
///
/// Recognises `\\ \' \" \a \b \f \n \r \t \v`, `\xhh`, up to three octal
/// digits and backslash-newline continuations. Unknown escapes are kept
/// verbatim, backslash included. Non-ASCII characters pass through as UTF-8.
pub fn escaped_str_to_bytes(text: &str) -> EscapeResult<Vec<u8>> {
    let input = text.as_bytes();
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        let b = input[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }

        let Some(&next) = input.get(i + 1) else {
            return Err(EscapeError::TrailingBackslash { position: i });
        };

        match next {
            b'\n' => {}
            b'\\' => out.push(b'\\'),
            b'\'' => out.push(b'\''),
            b'"' => out.push(b'"'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'v' => out.push(0x0b),
            b'x' => {
                let hex = match input.get(i + 2..i + 4) {
                    Some(&[hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                        (hex_digit(hi) << 4) | hex_digit(lo)
                    }
                    _ => return Err(EscapeError::InvalidHexEscape { position: i }),
                };
                out.push(hex);
                i += 4;
                continue;
            }
            b'0'..=b'7' => {
                let mut value: u32 = 0;
                let mut j = i + 1;
                while j < input.len() && j < i + 4 && (b'0'..=b'7').contains(&input[j]) {
                    value = value * 8 + u32::from(input[j] - b'0');
                    j += 1;
                }
                out.push((value & 0xff) as u8);
                i = j;
                continue;
            }
            other => {
                out.push(b'\\');
                out.push(other);
            }
        }
        i += 2;
    }

    Ok(out)
}

/// Value of an ASCII hex digit already checked with `is_ascii_hexdigit`
fn hex_digit(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}
