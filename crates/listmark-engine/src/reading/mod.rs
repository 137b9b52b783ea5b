//! # Reading Mode
//!
//! Whole-document rendering to HTML in two phases:
//!
//! - **`parser`**: analyses the full source, registers every label and
//!   builds a [`ParsedNode`] tree of lists, definition lists and prose
//! - **`render`**: walks the tree and writes HTML, resolving references
//!   against the complete registry
//!
//! Numbering comes from the same analysis the live pipeline runs, so a
//! document shows the same labels in both modes.

pub mod node;
pub mod parser;
pub mod render;

pub use node::{NodeKind, ParsedNode};
pub use parser::{ParsedDocument, parse_document};
pub use render::{render_into, render_markdown};
