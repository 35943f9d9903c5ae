//! Parses the three numeric literal forms the grammar accepts and validates
//! them against the range a given operand kind allows.

use crate::error::LexError;

/// Parses a decimal, `0x` hex, or `0b` binary literal into an `i32`. The
/// grammar only ever hands this function text it has already validated as
/// one of the three forms, so malformed input here means the literal
/// overflowed `i32`, not that it is lexically invalid.
pub fn parse_number(text: &str) -> Result<i32, LexError> {
    let lower = text.to_ascii_lowercase();
    let result = if let Some(digits) = lower.strip_prefix("0x") {
        i32::from_str_radix(digits, 16)
    } else if let Some(digits) = lower.strip_prefix("0b") {
        i32::from_str_radix(digits, 2)
    } else {
        text.parse::<i32>()
    };
    result.map_err(|_| LexError::NumberOutOfRange(text.to_string()))
}

/// Validates a value meant to occupy a single unsigned byte (immediates,
/// direct/indexed addresses, branch targets): `0..=255`.
pub fn as_u8(value: i32, text: &str) -> Result<u8, LexError> {
    if (0..=255).contains(&value) {
        Ok(value as u8)
    } else {
        Err(LexError::NumberOutOfRange(text.to_string()))
    }
}

/// Validates a signed indexed-addressing offset: `-128..=127`.
pub fn as_i8_offset(value: i32, text: &str) -> Result<i8, LexError> {
    if (-128..=127).contains(&value) {
        Ok(value as i8)
    } else {
        Err(LexError::NumberOutOfRange(text.to_string()))
    }
}

/// Validates a `.DB` value: accepts the full signed-or-unsigned byte range
/// `-128..=255` and masks it down to its low 8 bits, so `-1` and `255` both
/// emit `0xFF`.
pub fn as_db_byte(value: i32, text: &str) -> Result<u8, LexError> {
    if (-128..=255).contains(&value) {
        Ok((value & 0xFF) as u8)
    } else {
        Err(LexError::NumberOutOfRange(text.to_string()))
    }
}

/// Expands the escape sequences `grammar.pest`'s `string_inner` rule admits.
pub fn unescape(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push(b'\n'),
                Some('t') => out.push(b'\t'),
                Some('r') => out.push(b'\r'),
                Some('0') => out.push(0),
                Some('\\') => out.push(b'\\'),
                Some(other) => out.push(other as u8),
                None => {}
            }
        } else {
            out.push(c as u8);
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_all_three_bases() {
        assert_eq!(parse_number("42"), Ok(42));
        assert_eq!(parse_number("-5"), Ok(-5));
        assert_eq!(parse_number("0xFF"), Ok(255));
        assert_eq!(parse_number("0b1010"), Ok(10));
    }

    #[test]
    fn db_byte_accepts_signed_and_unsigned_range() {
        assert_eq!(as_db_byte(-1, "-1"), Ok(0xFF));
        assert_eq!(as_db_byte(255, "255"), Ok(0xFF));
        assert!(as_db_byte(256, "256").is_err());
        assert!(as_db_byte(-129, "-129").is_err());
    }

    #[test]
    fn unescape_handles_known_escapes() {
        assert_eq!(unescape(r"a\nb\0c"), vec![b'a', b'\n', b'b', 0, b'c']);
    }
}
