//! # Live preview
//!
//! Incremental decoration of an editor buffer.
//!
//! - **`decoration`**: widgets, marks, hidden ranges and line classes
//! - **`registry`**: processor registration and fault isolation
//! - **`structural`** / **`inline`**: the processors
//! - **`blocks`**: the ranges decorations are computed for
//! - **`pipeline`**: [`LivePipeline`], which ties it together

pub mod blocks;
pub mod decoration;
pub mod inline;
pub mod pipeline;
pub mod registry;
pub mod structural;

pub use blocks::{Block, BlockState};
pub use decoration::{
    BlockUpdate, Decoration, DecorationDiff, DecorationKind, LineClass, MarkKind, Widget,
};
pub use pipeline::{LivePipeline, PassStats, PendingPass};
pub use registry::{Processor, ProcessorKind, ProcessorRegistry};
