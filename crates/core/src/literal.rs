//! Decoding and encoding of Go literal token text.

use crate::result::{Error, Result};

/// Decodes string literal token text into the bytes it denotes.
///
/// Accepts interpreted (`"..."`) and raw (`` `...` ``) literals. Raw literals drop carriage
/// returns, interpreted literals resolve every escape sequence.
pub fn unquote(text: &str) -> Result<Vec<u8>> {
    let malformed = |reason: &str| Error::MalformedLiteral {
        text: text.to_string(),
        reason: reason.to_string(),
    };

    if text.len() < 2 {
        return Err(malformed("literal too short"));
    }

    if let Some(inner) = text.strip_prefix('`') {
        let inner = inner
            .strip_suffix('`')
            .ok_or_else(|| malformed("unterminated raw literal"))?;
        if inner.contains('`') {
            return Err(malformed("backquote inside raw literal"));
        }
        return Ok(inner.bytes().filter(|&b| b != b'\r').collect());
    }

    let inner = text
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| malformed("missing quotes"))?;

    let mut out = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Err(malformed("unescaped quote")),
            '\n' => return Err(malformed("newline in literal")),
            '\\' => {
                let esc = chars.next().ok_or_else(|| malformed("trailing backslash"))?;
                match esc {
                    'a' => out.push(0x07),
                    'b' => out.push(0x08),
                    'f' => out.push(0x0c),
                    'n' => out.push(b'\n'),
                    'r' => out.push(b'\r'),
                    't' => out.push(b'\t'),
                    'v' => out.push(0x0b),
                    '\\' => out.push(b'\\'),
                    '"' => out.push(b'"'),
                    '0'..='7' => {
                        let mut value = esc.to_digit(8).unwrap_or(0);
                        for _ in 0..2 {
                            let digit = chars
                                .next()
                                .and_then(|d| d.to_digit(8))
                                .ok_or_else(|| malformed("short octal escape"))?;
                            value = value * 8 + digit;
                        }
                        if value > 0xff {
                            return Err(malformed("octal escape out of range"));
                        }
                        out.push(value as u8);
                    }
                    'x' => {
                        let value = read_hex(&mut chars, 2)
                            .ok_or_else(|| malformed("bad \\x escape"))?;
                        out.push(value as u8);
                    }
                    'u' | 'U' => {
                        let digits = if esc == 'u' { 4 } else { 8 };
                        let value = read_hex(&mut chars, digits)
                            .ok_or_else(|| malformed("bad unicode escape"))?;
                        let ch = char::from_u32(value)
                            .ok_or_else(|| malformed("invalid code point"))?;
                        let mut buf = [0u8; 4];
                        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    }
                    _ => return Err(malformed("unknown escape sequence")),
                }
            }
            _ => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    Ok(out)
}

fn read_hex(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

/// Encodes bytes as an interpreted Go string literal.
pub fn quote(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for chunk in bytes.utf8_chunks() {
        for c in chunk.valid().chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => {
                    if (c as u32) < 0x80 {
                        out.push_str(&format!("\\x{:02x}", c as u32));
                    } else {
                        out.push_str(&format!("\\u{:04x}", c as u32));
                    }
                }
                c => out.push(c),
            }
        }
        for b in chunk.invalid() {
            out.push_str(&format!("\\x{b:02x}"));
        }
    }
    out.push('"');
    out
}

/// Parses Go integer literal text: decimal, `0x`, `0o`, `0b`, legacy `0` octal, `_` separators.
pub fn parse_int(text: &str) -> Option<u64> {
    let clean: String = text.chars().filter(|&c| c != '_').collect();
    let lower = clean.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (&lower[1..], 8)
    } else {
        (lower.as_str(), 10)
    };
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

/// Parses Go floating-point literal text. Hexadecimal floats are not supported.
pub fn parse_float(text: &str) -> Option<f64> {
    let clean: String = text.chars().filter(|&c| c != '_').collect();
    if clean.to_ascii_lowercase().starts_with("0x") {
        return None;
    }
    clean.parse::<f64>().ok()
}

/// Like [`parse_float`], rounding the decimal text straight to single precision.
pub fn parse_float32(text: &str) -> Option<f32> {
    let clean: String = text.chars().filter(|&c| c != '_').collect();
    if clean.to_ascii_lowercase().starts_with("0x") {
        return None;
    }
    clean.parse::<f32>().ok()
}
