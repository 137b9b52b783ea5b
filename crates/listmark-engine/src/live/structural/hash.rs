use crate::{
    error::ProcessError,
    live::registry::{LineContext, StructuralOutput},
    parsing::types::MarkerKind,
};

use super::{item_of, marker_build};

pub fn detect(ctx: &LineContext<'_>) -> bool {
    item_of(ctx, MarkerKind::Hash).is_some()
}

pub fn build(ctx: &LineContext<'_>) -> Result<StructuralOutput, ProcessError> {
    marker_build(ctx, MarkerKind::Hash)
}
