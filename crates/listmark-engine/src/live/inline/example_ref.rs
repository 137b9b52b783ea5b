use crate::{
    error::ProcessError,
    live::registry::{InlineContext, InlineOutput},
    parsing::{extract::ReferenceTarget, inline::InlineNode},
};

use super::reference_output;

pub fn detect(node: &InlineNode) -> bool {
    matches!(node, InlineNode::ExampleRef { .. })
}

pub fn build(ctx: &InlineContext<'_>, node: &InlineNode) -> Result<InlineOutput, ProcessError> {
    let InlineNode::ExampleRef { full, label } = node else {
        return Err(ProcessError::ProcessorFailed {
            processor: "example-reference",
            message: "not an example reference".to_string(),
        });
    };
    let target = ReferenceTarget::from_example_ref(ctx.slice(*label));
    Ok(reference_output(ctx, *full, target))
}
