//! # Inline processors
//!
//! Run on the part of each line that no structural processor consumed. The
//! nodes come from the same inline parser reading mode uses, so code spans
//! are raw zones here too.

pub mod example_ref;
pub mod label_ref;
pub mod subscript;
pub mod superscript;

use crate::{
    error::{Diagnostic, ProcessError},
    live::{
        decoration::{Decoration, MarkKind, Widget},
        registry::{InlineContext, InlineOutput, Processor, ProcessorKind},
    },
    parsing::{extract::ReferenceTarget, rope::span::Span},
};

pub(crate) fn defaults() -> Vec<(ProcessorKind, u32, Processor)> {
    vec![
        (
            ProcessorKind::LabelReference,
            110,
            Processor::Inline {
                detect: label_ref::detect,
                build: label_ref::build,
            },
        ),
        (
            ProcessorKind::ExampleReference,
            120,
            Processor::Inline {
                detect: example_ref::detect,
                build: example_ref::build,
            },
        ),
        (
            ProcessorKind::Superscript,
            130,
            Processor::Inline {
                detect: superscript::detect,
                build: superscript::build,
            },
        ),
        (
            ProcessorKind::Subscript,
            140,
            Processor::Inline {
                detect: subscript::detect,
                build: subscript::build,
            },
        ),
    ]
}

/// Resolves a reference and draws it. Broken references stay visible as
/// written and produce a diagnostic.
pub(crate) fn reference_output(
    ctx: &InlineContext<'_>,
    full: Span,
    target: Option<ReferenceTarget>,
) -> InlineOutput {
    let raw = ctx.slice(full).to_string();
    let record = target.map(|t| ctx.registry.resolve(&raw, &t));
    let mut out = InlineOutput::default();

    match &record {
        Some(rec) if rec.is_resolved() => {
            let decoration = if ctx.cursor_in(full) {
                Decoration::mark(full, MarkKind::RevealedMarker)
            } else {
                Decoration::replace(
                    full,
                    Widget::Reference {
                        display: rec.display.clone().unwrap_or_default(),
                        target: rec.resolved_id.clone().unwrap_or_default(),
                        stale: rec.stale,
                    },
                )
            };
            out.decorations.push(decoration);
        }
        _ => {
            out.decorations
                .push(Decoration::replace(full, Widget::BrokenReference { raw: raw.clone() }));
            out.diagnostics
                .push(Diagnostic::new(full, ProcessError::UnresolvedReference { raw }));
        }
    }
    out.references.extend(record);
    out
}

/// Superscript or subscript: the text is marked, the delimiters hidden
/// unless the cursor is inside.
pub(crate) fn script_output(
    ctx: &InlineContext<'_>,
    full: Span,
    inner: Span,
    mark: MarkKind,
) -> InlineOutput {
    let mut decorations = vec![Decoration::mark(inner, mark)];
    if !ctx.cursor_in(full) {
        decorations.push(Decoration::hide(Span::new(full.start, inner.start)));
        decorations.push(Decoration::hide(Span::new(inner.end, full.end)));
    }
    InlineOutput {
        decorations,
        ..InlineOutput::default()
    }
}
