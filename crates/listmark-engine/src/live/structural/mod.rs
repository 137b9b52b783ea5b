//! # Structural processors
//!
//! One processor per marker family plus definition lists and list
//! continuation lines. Each claims whole lines from the shared analysis and
//! replaces the marker with a widget, unless the cursor is inside the marker,
//! in which case the source stays visible under a "revealed" mark.

pub mod continuation;
pub mod custom_label;
pub mod definition;
pub mod example;
pub mod fancy;
pub mod hash;
pub mod standard;

use crate::{
    error::ProcessError,
    live::{
        decoration::{Decoration, LineClass, MarkKind, Widget},
        registry::{LineContext, Processor, ProcessorKind, StructuralOutput},
    },
    parsing::{
        analysis::LineRole,
        types::{ListItemRecord, MarkerKind, NumberingStatus},
    },
};

pub(crate) fn defaults() -> Vec<(ProcessorKind, u32, Processor)> {
    vec![
        (
            ProcessorKind::CustomLabel,
            10,
            Processor::Structural {
                detect: custom_label::detect,
                build: custom_label::build,
            },
        ),
        (
            ProcessorKind::Example,
            20,
            Processor::Structural {
                detect: example::detect,
                build: example::build,
            },
        ),
        (
            ProcessorKind::Hash,
            30,
            Processor::Structural {
                detect: hash::detect,
                build: hash::build,
            },
        ),
        (
            ProcessorKind::Fancy,
            40,
            Processor::Structural {
                detect: fancy::detect,
                build: fancy::build,
            },
        ),
        (
            ProcessorKind::Standard,
            50,
            Processor::Structural {
                detect: standard::detect,
                build: standard::build,
            },
        ),
        (
            ProcessorKind::Definition,
            60,
            Processor::Structural {
                detect: definition::detect,
                build: definition::build,
            },
        ),
        (
            ProcessorKind::Continuation,
            70,
            Processor::Structural {
                detect: continuation::detect,
                build: continuation::build,
            },
        ),
    ]
}

/// The item record on this line when it is of `kind`.
pub(crate) fn item_of<'a>(ctx: &LineContext<'a>, kind: MarkerKind) -> Option<&'a ListItemRecord> {
    match ctx.role {
        LineRole::Item { .. } => ctx.record.filter(|r| r.token.kind == kind),
        _ => None,
    }
}

pub(crate) fn require_item<'a>(
    ctx: &LineContext<'a>,
    kind: MarkerKind,
) -> Result<&'a ListItemRecord, ProcessError> {
    item_of(ctx, kind).ok_or_else(|| ProcessError::ProcessorFailed {
        processor: kind.as_str(),
        message: format!("line {} is not a {} item", ctx.line, kind.as_str()),
    })
}

/// The label to draw. Clamped items keep whatever they showed before.
pub(crate) fn shown_label(ctx: &LineContext<'_>, record: &ListItemRecord) -> String {
    match (record.status, ctx.last_known) {
        (NumberingStatus::Clamped, Some(last)) => last.to_string(),
        _ => record.label.display.clone(),
    }
}

/// Line class, marker widget (or revealed mark) and the stale mark for
/// clamped items.
pub(crate) fn item_output(
    ctx: &LineContext<'_>,
    record: &ListItemRecord,
    widget: Widget,
) -> StructuralOutput {
    let span = record.token.span();
    let mut decorations = vec![Decoration::line(
        ctx.scan.line.content,
        LineClass::ListItem {
            depth: record.depth,
        },
    )];
    if ctx.cursor_in(span) {
        decorations.push(Decoration::mark(span, MarkKind::RevealedMarker));
    } else {
        decorations.push(Decoration::replace(span, widget));
    }
    if record.status == NumberingStatus::Clamped {
        decorations.push(Decoration::mark(span, MarkKind::StaleNumber));
    }
    StructuralOutput {
        decorations,
        definitions: Vec::new(),
        inline_from: Some(record.token.content_start),
    }
}

/// Shared by the ordered and bullet families, which only differ in what
/// they claim.
pub(crate) fn marker_build(
    ctx: &LineContext<'_>,
    kind: MarkerKind,
) -> Result<StructuralOutput, ProcessError> {
    let record = require_item(ctx, kind)?;
    let widget = Widget::ListMarker {
        display: shown_label(ctx, record),
        kind,
        style: record.token.style,
    };
    Ok(item_output(ctx, record, widget))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{
        live::registry::LineContext,
        parsing::analysis::{Analysis, analyze_text},
        settings::ProcessingConfig,
    };

    pub fn analysis(text: &str) -> Analysis {
        analyze_text(text, &ProcessingConfig::default())
    }

    pub fn context<'a>(
        analysis: &'a Analysis,
        line: usize,
        cursor: Option<usize>,
        config: &'a ProcessingConfig,
    ) -> LineContext<'a> {
        LineContext {
            line,
            scan: &analysis.lines[line],
            role: analysis.roles[line],
            record: analysis.record_at_line(line),
            last_known: None,
            cursor,
            config,
        }
    }
}
