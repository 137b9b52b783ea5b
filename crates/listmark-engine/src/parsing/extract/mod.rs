//! Extractors turn matched marker and reference text into structured
//! records: label ids, placeholder expansions, reference targets and
//! definition-list blocks.

pub mod custom_label;
pub mod definition;
pub mod example;
pub mod reference;

pub use custom_label::{PlaceholderTable, normalize_label};
pub use definition::{DefinitionGroup, DefinitionItem, extract_definitions};
pub use example::example_id;
pub use reference::ReferenceTarget;
