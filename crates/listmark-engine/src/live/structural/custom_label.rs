use crate::{
    error::ProcessError,
    labels::definition_of,
    live::{
        decoration::Widget,
        registry::{LineContext, StructuralOutput},
    },
    parsing::{extract::normalize_label, types::MarkerKind},
};

use super::{item_of, item_output, require_item, shown_label};

pub fn detect(ctx: &LineContext<'_>) -> bool {
    item_of(ctx, MarkerKind::CustomLabel).is_some()
}

pub fn build(ctx: &LineContext<'_>) -> Result<StructuralOutput, ProcessError> {
    let record = require_item(ctx, MarkerKind::CustomLabel)?;
    let widget = Widget::CustomLabel {
        display: shown_label(ctx, record),
        id: normalize_label(&record.label.text),
    };
    let mut out = item_output(ctx, record, widget);
    out.definitions.extend(definition_of(record));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        live::{
            decoration::DecorationKind,
            structural::test_support::{analysis, context},
        },
        settings::ProcessingConfig,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn label_is_displayed_and_registered() {
        let config = ProcessingConfig::default();
        let a = analysis("(foo) First\n");
        let ctx = context(&a, 0, None, &config);
        assert!(detect(&ctx));
        let out = build(&ctx).unwrap();
        assert_eq!(out.definitions[0].0, "foo");
        assert!(matches!(
            &out.decorations[1].kind,
            DecorationKind::Replace(Widget::CustomLabel { display, .. }) if display == "(foo)"
        ));
    }

    #[test]
    fn placeholders_expand_in_widget_and_id() {
        let config = ProcessingConfig::default();
        let a = analysis("(P(#a)) one\n(Q(#b)) two\n");
        let out = build(&context(&a, 1, None, &config)).unwrap();
        assert_eq!(out.definitions[0].0, "Q2");
        assert_eq!(out.definitions[0].1.display, "(Q2)");
    }
}
