//! `#.` and `#)` auto-numbered markers.

use crate::parsing::{
    patterns::HASH_MARKER,
    types::{Delimiter, MarkerKind, NumberStyle},
};

use super::{MarkerMatch, ScanContext, ScanOutcome};

pub fn scan(text: &str, ctx: &ScanContext<'_>) -> ScanOutcome {
    let Some(m) = MarkerMatch::find(&HASH_MARKER, text) else {
        return ScanOutcome::NotMarker;
    };
    let delimiter = match m.group("delim") {
        Some(")") => Delimiter::RightParen,
        _ => Delimiter::Period,
    };
    ScanOutcome::Marker(m.token(ctx, MarkerKind::Hash, NumberStyle::Hash, delimiter))
}
