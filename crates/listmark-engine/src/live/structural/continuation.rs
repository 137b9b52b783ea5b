use crate::{
    error::ProcessError,
    live::{
        decoration::{Decoration, LineClass},
        registry::{LineContext, StructuralOutput},
    },
    parsing::analysis::LineRole,
};

pub fn detect(ctx: &LineContext<'_>) -> bool {
    matches!(ctx.role, LineRole::Continuation { .. })
}

/// Indents a continuation line to its item's depth. Code inside an item gets
/// the class but no inline processing.
pub fn build(ctx: &LineContext<'_>) -> Result<StructuralOutput, ProcessError> {
    let LineRole::Continuation { depth, .. } = ctx.role else {
        return Err(ProcessError::ProcessorFailed {
            processor: "continuation",
            message: format!("line {} is not a continuation", ctx.line),
        });
    };
    let content = ctx.scan.line.content;
    Ok(StructuralOutput {
        decorations: vec![Decoration::line(content, LineClass::Continuation { depth })],
        definitions: Vec::new(),
        inline_from: (!ctx.scan.in_code).then_some(content.start),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{live::structural::test_support::{analysis, context}, settings::ProcessingConfig};

    #[test]
    fn nested_continuation_carries_depth() {
        let config = ProcessingConfig::default();
        let a = analysis("- a\n  - b\n    more\n");
        let ctx = context(&a, 2, None, &config);
        assert!(detect(&ctx));
        let out = build(&ctx).unwrap();
        assert_eq!(
            out.decorations[0].kind,
            crate::live::decoration::DecorationKind::Line(LineClass::Continuation { depth: 1 })
        );
    }
}
