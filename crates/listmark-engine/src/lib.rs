pub mod editing;
pub mod error;
pub mod labels;
pub mod live;
pub mod parsing;
pub mod reading;
pub mod settings;
pub mod suggest;

// Re-export key types for easier usage
pub use editing::{Cmd, Document, Patch};
pub use error::{Diagnostic, PipelineError, ProcessError, SettingsError, Severity};
pub use labels::{LabelRegistry, ReferenceRecord};
pub use live::{Decoration, DecorationDiff, DecorationKind, LivePipeline, Widget};
pub use parsing::{
    rope::Span,
    types::{ItemLabel, ListItemRecord, MarkerKind, MarkerToken},
};
pub use reading::{ParsedNode, render_into, render_markdown};
pub use settings::{ContinuationPolicy, ProcessingConfig, Settings};
pub use suggest::{next_example_number, suggest_next_marker};
