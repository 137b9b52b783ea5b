//! Bullets and decimal markers.

use crate::parsing::{
    patterns::{BULLET_MARKER, DECIMAL_MARKER, MAX_DECIMAL_DIGITS},
    types::{Delimiter, MarkerKind, NumberStyle},
};

use super::{MarkerMatch, ScanContext, ScanOutcome};

pub fn scan(text: &str, ctx: &ScanContext<'_>) -> ScanOutcome {
    if let Some(m) = MarkerMatch::find(&DECIMAL_MARKER, text) {
        let (digits, delimiter) = match m.group("paren") {
            Some(d) => (d, Delimiter::Parens),
            None => (
                m.group("bare").unwrap_or_default(),
                if m.group("delim") == Some(")") {
                    Delimiter::RightParen
                } else {
                    Delimiter::Period
                },
            ),
        };
        let mut token = m.token(ctx, MarkerKind::Standard, NumberStyle::Decimal, delimiter);
        if digits.len() > MAX_DECIMAL_DIGITS {
            token.malformed_literal = true;
        } else {
            token.literal = digits.parse().ok();
            token.malformed_literal = token.literal.is_none();
        }
        return ScanOutcome::Marker(token);
    }

    if let Some(m) = MarkerMatch::find(&BULLET_MARKER, text) {
        let mut token = m.token(ctx, MarkerKind::Standard, NumberStyle::Bullet, Delimiter::None);
        token.bullet = m.marker().chars().next();
        return ScanOutcome::Marker(token);
    }

    ScanOutcome::NotMarker
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ProcessingConfig;

    fn token(text: &str) -> crate::parsing::types::MarkerToken {
        let cfg = ProcessingConfig::default();
        match scan(text, &ScanContext::new(0, &[], &cfg)) {
            ScanOutcome::Marker(t) => t,
            other => panic!("expected marker, got {other:?}"),
        }
    }

    #[test]
    fn decimal_literals_and_delimiters() {
        let t = token("12) twelve");
        assert_eq!(t.literal, Some(12));
        assert_eq!(t.delimiter, Delimiter::RightParen);
        assert_eq!(token("(3) x").delimiter, Delimiter::Parens);
    }

    #[test]
    fn ten_digits_is_malformed() {
        let t = token("1234567890. x");
        assert!(t.malformed_literal);
        assert_eq!(t.literal, None);
    }

    #[test]
    fn bullets_remember_their_character() {
        assert_eq!(token("* x").bullet, Some('*'));
        assert_eq!(token("+").bullet, Some('+'));
    }
}
