use crate::{
    error::ProcessError,
    live::{
        decoration::{Decoration, LineClass, MarkKind, Widget},
        registry::{LineContext, StructuralOutput},
    },
    parsing::{analysis::LineRole, rope::span::Span, types::MarkerKind},
};

pub fn detect(ctx: &LineContext<'_>) -> bool {
    matches!(
        ctx.role,
        LineRole::DefinitionTerm { .. }
            | LineRole::DefinitionMarker { .. }
            | LineRole::DefinitionContinuation { .. }
    )
}

pub fn build(ctx: &LineContext<'_>) -> Result<StructuralOutput, ProcessError> {
    let content = ctx.scan.line.content;
    let out = match ctx.role {
        LineRole::DefinitionTerm { .. } => {
            let text = ctx.scan.text();
            let start = content.start + (text.len() - text.trim_start().len());
            let term = Span::new(start, content.start + text.trim_end().len());
            StructuralOutput {
                decorations: vec![
                    Decoration::line(content, LineClass::DefinitionTerm),
                    Decoration::mark(term, MarkKind::DefinitionTerm),
                ],
                definitions: Vec::new(),
                inline_from: Some(start),
            }
        }
        LineRole::DefinitionMarker { .. } => {
            let token = ctx
                .scan
                .marker
                .as_ref()
                .filter(|t| t.kind == MarkerKind::Definition)
                .ok_or_else(|| ProcessError::ProcessorFailed {
                    processor: MarkerKind::Definition.as_str(),
                    message: format!("line {} has no definition marker", ctx.line),
                })?;
            let marker = if ctx.cursor_in(token.span()) {
                Decoration::mark(token.span(), MarkKind::RevealedMarker)
            } else {
                Decoration::replace(token.span(), Widget::DefinitionBullet)
            };
            StructuralOutput {
                decorations: vec![Decoration::line(content, LineClass::Definition), marker],
                definitions: Vec::new(),
                inline_from: Some(token.content_start),
            }
        }
        _ => StructuralOutput {
            decorations: vec![Decoration::line(content, LineClass::Definition)],
            definitions: Vec::new(),
            inline_from: Some(content.start),
        },
    };
    Ok(out)
}
