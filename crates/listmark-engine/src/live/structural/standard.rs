use crate::{
    error::ProcessError,
    live::registry::{LineContext, StructuralOutput},
    parsing::types::MarkerKind,
};

use super::{item_of, marker_build};

pub fn detect(ctx: &LineContext<'_>) -> bool {
    item_of(ctx, MarkerKind::Standard).is_some()
}

pub fn build(ctx: &LineContext<'_>) -> Result<StructuralOutput, ProcessError> {
    marker_build(ctx, MarkerKind::Standard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        live::{
            decoration::{Decoration, DecorationKind, LineClass, MarkKind, Widget},
            structural::test_support::{analysis, context},
        },
        parsing::{rope::span::Span, types::NumberStyle},
        settings::ProcessingConfig,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn decimal_marker_becomes_widget() {
        let config = ProcessingConfig::default();
        let a = analysis("1. a\n1. b\n");
        let ctx = context(&a, 1, None, &config);
        assert!(detect(&ctx));
        let out = build(&ctx).unwrap();
        assert_eq!(
            out.decorations,
            vec![
                Decoration::line(Span::new(5, 9), LineClass::ListItem { depth: 0 }),
                Decoration::replace(
                    Span::new(5, 7),
                    Widget::ListMarker {
                        display: "2.".into(),
                        kind: MarkerKind::Standard,
                        style: NumberStyle::Decimal,
                    }
                ),
            ]
        );
        assert_eq!(out.inline_from, Some(8));
    }

    #[test]
    fn cursor_inside_marker_reveals_it() {
        let config = ProcessingConfig::default();
        let a = analysis("- a\n");
        let out = build(&context(&a, 0, Some(1), &config)).unwrap();
        assert_eq!(
            out.decorations[1].kind,
            DecorationKind::Mark(MarkKind::RevealedMarker)
        );
    }

    #[test]
    fn other_families_are_not_claimed() {
        let config = ProcessingConfig::default();
        let a = analysis("a. x\nplain\n");
        assert!(!detect(&context(&a, 0, None, &config)));
        assert!(!detect(&context(&a, 1, None, &config)));
        assert!(build(&context(&a, 1, None, &config)).is_err());
    }
}
