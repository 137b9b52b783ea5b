use crate::{
    error::ProcessError,
    live::registry::{InlineContext, InlineOutput},
    parsing::{extract::ReferenceTarget, inline::InlineNode},
};

use super::reference_output;

pub fn detect(node: &InlineNode) -> bool {
    matches!(node, InlineNode::LabelRef { .. })
}

/// `\ref{label}`: the custom label, falling back to an example with the
/// same name.
pub fn build(ctx: &InlineContext<'_>, node: &InlineNode) -> Result<InlineOutput, ProcessError> {
    let InlineNode::LabelRef { full, label } = node else {
        return Err(ProcessError::ProcessorFailed {
            processor: "label-reference",
            message: "not a label reference".to_string(),
        });
    };
    let target = ReferenceTarget::from_label_ref(ctx.slice(*label));
    Ok(reference_output(ctx, *full, target))
}

#[cfg(test)]
mod tests {
    use crate::{
        error::ProcessError,
        labels::LabelRegistry,
        live::{
            decoration::{Decoration, MarkKind, Widget},
            inline::test_support::run,
        },
        parsing::{analysis::analyze_text, rope::span::Span},
        settings::ProcessingConfig,
    };
    use pretty_assertions::assert_eq;

    fn registry(text: &str) -> LabelRegistry {
        LabelRegistry::from_records(&analyze_text(text, &ProcessingConfig::default()).records)
    }

    #[test]
    fn resolved_reference_shows_the_label() {
        let config = ProcessingConfig::default();
        let out = run("see \\ref{foo}", &registry("(foo) First\n"), None, &config);
        assert_eq!(
            out.decorations,
            vec![Decoration::replace(
                Span::new(4, 13),
                Widget::Reference {
                    display: "(foo)".into(),
                    target: "foo".into(),
                    stale: false,
                }
            )]
        );
        assert!(out.diagnostics.is_empty());
        assert_eq!(out.references[0].resolved_id.as_deref(), Some("foo"));
    }

    #[test]
    fn unresolved_reference_is_broken_and_reported() {
        let config = ProcessingConfig::default();
        let out = run("\\ref{nope}", &LabelRegistry::new(), None, &config);
        assert_eq!(
            out.decorations,
            vec![Decoration::replace(
                Span::new(0, 10),
                Widget::BrokenReference {
                    raw: "\\ref{nope}".into()
                }
            )]
        );
        assert!(matches!(
            &out.diagnostics[0].error,
            ProcessError::UnresolvedReference { raw } if raw == "\\ref{nope}"
        ));
    }

    #[test]
    fn cursor_reveals_resolved_reference() {
        let config = ProcessingConfig::default();
        let out = run("\\ref{foo}", &registry("(foo) x\n"), Some(3), &config);
        assert_eq!(out.decorations, vec![Decoration::mark(Span::new(0, 9), MarkKind::RevealedMarker)]);
    }

    #[test]
    fn references_inside_code_are_ignored() {
        let config = ProcessingConfig::default();
        let out = run("`\\ref{nope}`", &LabelRegistry::new(), None, &config);
        assert!(out.decorations.is_empty());
        assert!(out.diagnostics.is_empty());
    }
}
