use crate::{
    error::ProcessError,
    labels::definition_of,
    live::{
        decoration::Widget,
        registry::{LineContext, StructuralOutput},
    },
    parsing::types::MarkerKind,
};

use super::{item_of, item_output, require_item, shown_label};

pub fn detect(ctx: &LineContext<'_>) -> bool {
    item_of(ctx, MarkerKind::Example).is_some()
}

/// Draws the document-wide example number and registers `(@label)`.
pub fn build(ctx: &LineContext<'_>) -> Result<StructuralOutput, ProcessError> {
    let record = require_item(ctx, MarkerKind::Example)?;
    let widget = Widget::ExampleNumber {
        display: shown_label(ctx, record),
        label: record.token.label.clone(),
    };
    let mut out = item_output(ctx, record, widget);
    out.definitions.extend(definition_of(record));
    Ok(out)
}
