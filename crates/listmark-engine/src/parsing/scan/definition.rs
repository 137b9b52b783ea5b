//! `: text` and `~ text` definition markers. Whether a term precedes the
//! marker is decided by the definition extractor, not here.

use crate::parsing::{
    patterns::DEFINITION_MARKER,
    types::{Delimiter, MarkerKind, NumberStyle},
};

use super::{MarkerMatch, ScanContext, ScanOutcome};

pub fn scan(text: &str, ctx: &ScanContext<'_>) -> ScanOutcome {
    let Some(m) = MarkerMatch::find(&DEFINITION_MARKER, text) else {
        return ScanOutcome::NotMarker;
    };
    ScanOutcome::Marker(m.token(
        ctx,
        MarkerKind::Definition,
        NumberStyle::Definition,
        Delimiter::None,
    ))
}
