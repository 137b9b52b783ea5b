//! `(Label)` markers, shaped by the configured template.

use crate::parsing::{
    numbering::alphabet::parse_roman,
    patterns::MAX_ALPHA_LETTERS,
    types::{Delimiter, MarkerKind, NumberStyle},
};

use super::{MarkerMatch, ScanContext, ScanOutcome};

pub fn scan(text: &str, ctx: &ScanContext<'_>) -> ScanOutcome {
    let re = ctx.config.custom_label().line_regex();
    let Some(m) = MarkerMatch::find(re, text) else {
        return ScanOutcome::NotMarker;
    };
    let label = m.group("label").unwrap_or_default();
    if looks_ordinal(label) {
        // `(a)`, `(iv)` and `(12)` belong to the ordered scanners.
        return ScanOutcome::NotMarker;
    }
    let mut token = m.token(ctx, MarkerKind::CustomLabel, NumberStyle::Label, Delimiter::None);
    token.label = Some(label.to_string());
    ScanOutcome::Marker(token)
}

/// Labels an ordered marker could also claim.
pub fn looks_ordinal(label: &str) -> bool {
    if label.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    if !label.bytes().all(|b| b.is_ascii_alphabetic()) {
        return false;
    }
    let uniform = label.bytes().all(|b| b.is_ascii_lowercase())
        || label.bytes().all(|b| b.is_ascii_uppercase());
    uniform && (label.len() <= MAX_ALPHA_LETTERS || parse_roman(label).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ProcessingConfig;
    use rstest::rstest;

    #[rstest]
    #[case("a", true)]
    #[case("IV", true)]
    #[case("xii", true)]
    #[case("42", true)]
    #[case("foo", false)]
    #[case("Ab", false)]
    #[case("Claim1", false)]
    #[case("P(#a)", false)]
    fn ordinal_lookalikes(#[case] label: &str, #[case] expected: bool) {
        assert_eq!(looks_ordinal(label), expected);
    }

    #[test]
    fn label_text_is_kept_as_written() {
        let cfg = ProcessingConfig::default();
        let ScanOutcome::Marker(t) = scan("(P(#a)) first", &ScanContext::new(0, &[], &cfg)) else {
            panic!("expected a marker");
        };
        assert_eq!(t.label.as_deref(), Some("P(#a)"));
        assert_eq!(t.raw, "(P(#a))");
    }
}
