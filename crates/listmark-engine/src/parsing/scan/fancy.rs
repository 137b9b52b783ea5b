//! Alphabetic and roman markers: `a.`, `B)`, `(c)`, `iv.`, `(IX)`.
//!
//! Letters that spell a roman numeral are ambiguous. A single `i` opens a
//! roman list unless it follows `h` (or any alphabetic item) at the same
//! indent; other single letters are alphabetic; longer runs are roman when
//! they are a canonical numeral. The open marker at the same indent wins
//! when it already fixes the style.

use crate::parsing::{
    numbering::alphabet::{is_roman_byte, parse_alpha, parse_roman},
    patterns::{FANCY_MARKER, MAX_ALPHA_LETTERS},
    types::{Delimiter, MarkerKind, NumberStyle},
};

use super::{MarkerMatch, ScanContext, ScanOutcome};

pub fn scan(text: &str, ctx: &ScanContext<'_>) -> ScanOutcome {
    let Some(m) = MarkerMatch::find(&FANCY_MARKER, text) else {
        return ScanOutcome::NotMarker;
    };
    let (letters, delimiter) = match m.group("paren") {
        Some(l) => (l, Delimiter::Parens),
        None => (
            m.group("bare").unwrap_or_default(),
            if m.group("delim") == Some(")") {
                Delimiter::RightParen
            } else {
                Delimiter::Period
            },
        ),
    };

    let upper = letters.bytes().all(|b| b.is_ascii_uppercase());
    let lower = letters.bytes().all(|b| b.is_ascii_lowercase());
    if !upper && !lower {
        return ScanOutcome::NotMarker;
    }

    if upper
        && letters.len() == 1
        && delimiter == Delimiter::Period
        && ctx.config.settings().strict_capital_letters
        && !wide_gap(m.gap())
    {
        return ScanOutcome::Ambiguous {
            text: m.marker().to_string(),
            reason: "a capital letter with a period needs two spaces after it",
        };
    }

    let Some((roman, literal, malformed)) = classify(letters, upper, delimiter, ctx, m.indent)
    else {
        return ScanOutcome::NotMarker;
    };
    let style = match (roman, upper) {
        (false, false) => NumberStyle::LowerAlpha,
        (false, true) => NumberStyle::UpperAlpha,
        (true, false) => NumberStyle::LowerRoman,
        (true, true) => NumberStyle::UpperRoman,
    };

    let mut token = m.token(ctx, MarkerKind::Fancy, style, delimiter);
    token.literal = literal;
    token.malformed_literal = malformed;
    ScanOutcome::Marker(token)
}

fn wide_gap(gap: &str) -> bool {
    gap.len() >= 2 || gap.contains('\t')
}

/// Returns (is roman, literal, malformed), or `None` when the letters are no
/// marker at all.
fn classify(
    letters: &str,
    upper: bool,
    delimiter: Delimiter,
    ctx: &ScanContext<'_>,
    indent: usize,
) -> Option<(bool, Option<u32>, bool)> {
    let prev_style = ctx
        .previous_at(indent)
        .filter(|p| p.family.kind == MarkerKind::Fancy && p.family.delimiter == delimiter)
        .map(|p| p.family.style);
    let (alpha_style, roman_style) = if upper {
        (NumberStyle::UpperAlpha, NumberStyle::UpperRoman)
    } else {
        (NumberStyle::LowerAlpha, NumberStyle::LowerRoman)
    };
    let all_roman = letters.bytes().all(is_roman_byte);
    let roman_value = parse_roman(letters);
    let short = letters.len() <= MAX_ALPHA_LETTERS;

    let alpha = || Some((false, parse_alpha(letters), false));
    let roman = |v: Option<u32>| Some((true, v, v.is_none()));

    if prev_style == Some(alpha_style) && short {
        return alpha();
    }
    if prev_style == Some(roman_style) && all_roman {
        return roman(roman_value);
    }
    if letters.len() == 1 {
        return if letters.eq_ignore_ascii_case("i") {
            roman(Some(1))
        } else {
            alpha()
        };
    }
    if roman_value.is_some() {
        return roman(roman_value);
    }
    if short {
        return alpha();
    }
    if all_roman {
        return roman(None);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        parsing::{scan::OpenMarker, types::ListFamily},
        settings::{ProcessingConfig, Settings},
    };
    use rstest::rstest;

    fn style_of(text: &str, open: &[OpenMarker]) -> Option<NumberStyle> {
        let cfg = ProcessingConfig::default();
        match scan(text, &ScanContext::new(0, open, &cfg)) {
            ScanOutcome::Marker(t) => Some(t.style),
            _ => None,
        }
    }

    fn open(style: NumberStyle) -> OpenMarker {
        OpenMarker {
            indent: 0,
            family: ListFamily {
                kind: MarkerKind::Fancy,
                style,
                delimiter: Delimiter::Period,
                bullet: None,
            },
            literal: None,
        }
    }

    #[rstest]
    #[case("a. x", Some(NumberStyle::LowerAlpha))]
    #[case("c. x", Some(NumberStyle::LowerAlpha))]
    #[case("i. x", Some(NumberStyle::LowerRoman))]
    #[case("iv. x", Some(NumberStyle::LowerRoman))]
    #[case("aa. x", Some(NumberStyle::LowerAlpha))]
    #[case("(C) x", Some(NumberStyle::UpperAlpha))]
    #[case("(IX) x", Some(NumberStyle::UpperRoman))]
    #[case("abc. x", None)]
    #[case("Ab. x", None)]
    fn letters_classify(#[case] text: &str, #[case] expected: Option<NumberStyle>) {
        assert_eq!(style_of(text, &[]), expected);
    }

    #[test]
    fn i_after_h_is_alphabetic() {
        assert_eq!(
            style_of("i. x", &[open(NumberStyle::LowerAlpha)]),
            Some(NumberStyle::LowerAlpha)
        );
    }

    #[test]
    fn v_after_iv_is_roman() {
        assert_eq!(
            style_of("v. x", &[open(NumberStyle::LowerRoman)]),
            Some(NumberStyle::LowerRoman)
        );
    }

    #[test]
    fn capital_period_needs_two_spaces() {
        let cfg = ProcessingConfig::default();
        let ctx = ScanContext::new(0, &[], &cfg);
        assert!(matches!(scan("B. Russell", &ctx), ScanOutcome::Ambiguous { .. }));
        assert!(matches!(scan("B.  Russell", &ctx), ScanOutcome::Marker(_)));
        assert!(matches!(scan("B) Russell", &ctx), ScanOutcome::Marker(_)));
    }

    #[test]
    fn relaxed_capitals_accept_one_space() {
        let cfg = Settings {
            strict_capital_letters: false,
            ..Settings::default()
        }
        .compile()
        .unwrap();
        assert!(matches!(
            scan("B. Russell", &ScanContext::new(0, &[], &cfg)),
            ScanOutcome::Marker(_)
        ));
    }

    #[test]
    fn non_canonical_roman_run_is_malformed() {
        let cfg = ProcessingConfig::default();
        let ScanOutcome::Marker(t) = scan("iiii. x", &ScanContext::new(0, &[], &cfg)) else {
            panic!("expected marker");
        };
        assert!(t.malformed_literal);
        assert_eq!(t.style, NumberStyle::LowerRoman);
    }
}
