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
    matches!(node, InlineNode::Subscript { .. })
}

pub fn build(ctx: &InlineContext<'_>, node: &InlineNode) -> Result<InlineOutput, ProcessError> {
    match node {
        InlineNode::Subscript { full, inner } => {
            Ok(script_output(ctx, *full, *inner, MarkKind::Subscript))
        }
        _ => Err(ProcessError::ProcessorFailed {
            processor: "subscript",
            message: "not a subscript".to_string(),
        }),
    }
}
