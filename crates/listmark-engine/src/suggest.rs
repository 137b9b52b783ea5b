//! Read-only queries for autocompletion: what marker would continue the list
//! at a given line.

use crate::parsing::{
    analysis::{Analysis, LineRole},
    numbering::alphabet::format_ordinal,
    types::{ListItemRecord, MarkerKind, NumberStyle},
};

/// A marker to insert on a new line, with the indentation it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedMarker {
    pub indent: usize,
    pub text: String,
}

/// The item `line` belongs to, either as its marker line or as a
/// continuation.
fn owning_record(analysis: &Analysis, line: usize) -> Option<&ListItemRecord> {
    match analysis.roles.get(line)? {
        LineRole::Item { record } | LineRole::Continuation { record, .. } => {
            analysis.records.get(*record)
        }
        _ => None,
    }
}

/// Marker for a new sibling inserted after the item that owns `line`.
///
/// Custom labels have no natural successor and yield `None`.
pub fn suggest_next_marker(analysis: &Analysis, line: usize) -> Option<SuggestedMarker> {
    if let Some(LineRole::DefinitionMarker { .. } | LineRole::DefinitionContinuation { .. }) =
        analysis.roles.get(line)
    {
        return Some(SuggestedMarker {
            indent: 0,
            text: ":".to_string(),
        });
    }

    let record = owning_record(analysis, line)?;
    let token = &record.token;
    let text = match token.kind {
        MarkerKind::CustomLabel | MarkerKind::Definition => return None,
        MarkerKind::Example => "(@)".to_string(),
        MarkerKind::Hash => token.raw.clone(),
        MarkerKind::Standard if token.style == NumberStyle::Bullet => {
            token.bullet.unwrap_or('-').to_string()
        }
        MarkerKind::Standard | MarkerKind::Fancy => token
            .delimiter
            .wrap(&format_ordinal(record.label.ordinal + 1, token.style)),
    };
    Some(SuggestedMarker {
        indent: token.indent,
        text,
    })
}

/// Number an example item inserted at `line` would receive.
pub fn next_example_number(analysis: &Analysis, line: usize) -> u32 {
    let before = analysis
        .records
        .iter()
        .filter(|r| r.line < line && r.token.kind == MarkerKind::Example)
        .count();
    u32::try_from(before).unwrap_or(u32::MAX).saturating_add(1)
}
