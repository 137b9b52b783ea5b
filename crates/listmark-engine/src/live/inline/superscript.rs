use crate::{
    error::ProcessError,
    live::{
        decoration::MarkKind,
        registry::{InlineContext, InlineOutput},
    },
    parsing::inline::InlineNode,
};

use super::script_output;

pub fn detect(node: &InlineNode) -> bool {
    matches!(node, InlineNode::Superscript { .. })
}

pub fn build(ctx: &InlineContext<'_>, node: &InlineNode) -> Result<InlineOutput, ProcessError> {
    match node {
        InlineNode::Superscript { full, inner } => {
            Ok(script_output(ctx, *full, *inner, MarkKind::Superscript))
        }
        _ => Err(ProcessError::ProcessorFailed {
            processor: "superscript",
            message: "not a superscript".to_string(),
        }),
    }
}
