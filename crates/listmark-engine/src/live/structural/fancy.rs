use crate::{
    error::ProcessError,
    live::registry::{LineContext, StructuralOutput},
    parsing::types::MarkerKind,
};

use super::{item_of, marker_build};

pub fn detect(ctx: &LineContext<'_>) -> bool {
    item_of(ctx, MarkerKind::Fancy).is_some()
}

pub fn build(ctx: &LineContext<'_>) -> Result<StructuralOutput, ProcessError> {
    marker_build(ctx, MarkerKind::Fancy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        live::{
            decoration::{DecorationKind, Widget},
            structural::test_support::{analysis, context},
        },
        settings::ProcessingConfig,
    };

    fn widget_text(text: &str, line: usize) -> String {
        let config = ProcessingConfig::default();
        let a = analysis(text);
        let out = build(&context(&a, line, None, &config)).unwrap();
        match &out.decorations[1].kind {
            DecorationKind::Replace(w @ Widget::ListMarker { .. }) => w.text().to_string(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn letters_and_numerals_show_renumbered_labels() {
        assert_eq!(widget_text("a) x\nq) y\n", 1), "b)");
        assert_eq!(widget_text("(iv) x\n(iv) y\n", 1), "(v)");
    }
}
