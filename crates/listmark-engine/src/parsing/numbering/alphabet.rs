//! Counter alphabets: decimal, alphabetic (bijective base 26) and roman.

use crate::parsing::types::NumberStyle;

const ROMAN: [(u32, &str); 13] = [
    (1000, "m"),
    (900, "cm"),
    (500, "d"),
    (400, "cd"),
    (100, "c"),
    (90, "xc"),
    (50, "l"),
    (40, "xl"),
    (10, "x"),
    (9, "ix"),
    (5, "v"),
    (4, "iv"),
    (1, "i"),
];

/// Largest value written with standard roman numerals; above it extra
/// leading `m`s are used.
pub const ROMAN_MAX: u32 = 3999;

/// Formats `n` (1-based) in the given style. Zero formats as an empty string
/// for every alphabet except decimal.
pub fn format_ordinal(n: u32, style: NumberStyle) -> String {
    match style {
        NumberStyle::LowerAlpha => to_alpha(n),
        NumberStyle::UpperAlpha => to_alpha(n).to_ascii_uppercase(),
        NumberStyle::LowerRoman => to_roman(n),
        NumberStyle::UpperRoman => to_roman(n).to_ascii_uppercase(),
        _ => n.to_string(),
    }
}

/// Bijective base-26: `a`..`z`, then `aa`, `ab`, ... `az`, `ba`.
pub fn to_alpha(mut n: u32) -> String {
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'a' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Inverse of [`to_alpha`]; case-insensitive. `None` for empty or non-letter
/// input and on overflow.
pub fn parse_alpha(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut n: u32 = 0;
    for b in s.bytes() {
        if !b.is_ascii_alphabetic() {
            return None;
        }
        let digit = u32::from(b.to_ascii_lowercase() - b'a' + 1);
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n)
}

pub fn to_roman(n: u32) -> String {
    let mut out = String::new();
    let mut rest = n;
    if rest > ROMAN_MAX {
        let extra = (rest - ROMAN_MAX).div_ceil(1000);
        out.push_str(&"m".repeat(extra as usize));
        rest -= extra * 1000;
    }
    for (value, glyph) in ROMAN {
        while rest >= value {
            out.push_str(glyph);
            rest -= value;
        }
    }
    out
}

/// Parses a canonical roman numeral (case-insensitive). Non-canonical
/// spellings such as `iiii` or `vx` are rejected.
pub fn parse_roman(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 24 || !s.bytes().all(is_roman_byte) {
        return None;
    }
    let lower = s.to_ascii_lowercase();
    let values: Vec<i64> = lower.bytes().map(roman_value).collect();
    let mut total: i64 = 0;
    for (i, v) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(next) if next > v => total -= v,
            _ => total += v,
        }
    }
    let total = u32::try_from(total).ok().filter(|t| *t > 0)?;
    (to_roman(total) == lower).then_some(total)
}

fn roman_value(b: u8) -> i64 {
    match b {
        b'i' => 1,
        b'v' => 5,
        b'x' => 10,
        b'l' => 50,
        b'c' => 100,
        b'd' => 500,
        _ => 1000,
    }
}

pub fn is_roman_byte(b: u8) -> bool {
    matches!(
        b.to_ascii_lowercase(),
        b'i' | b'v' | b'x' | b'l' | b'c' | b'd' | b'm'
    )
}
