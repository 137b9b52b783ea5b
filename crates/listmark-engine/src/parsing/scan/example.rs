//! `(@)` and `(@label)` example markers.

use crate::parsing::{
    patterns::EXAMPLE_MARKER,
    types::{Delimiter, MarkerKind, NumberStyle},
};

use super::{MarkerMatch, ScanContext, ScanOutcome};

pub fn scan(text: &str, ctx: &ScanContext<'_>) -> ScanOutcome {
    let Some(m) = MarkerMatch::find(&EXAMPLE_MARKER, text) else {
        return ScanOutcome::NotMarker;
    };
    let mut token = m.token(ctx, MarkerKind::Example, NumberStyle::Example, Delimiter::Parens);
    token.label = m
        .group("label")
        .filter(|l| !l.is_empty())
        .map(str::to_string);
    ScanOutcome::Marker(token)
}
