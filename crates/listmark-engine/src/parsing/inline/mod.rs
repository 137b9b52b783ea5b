//! # Inline Parsing
//!
//! Cursor-based parsing of the inline constructs this crate adds to
//! markdown, with code spans as raw zones.
//!
//! - **`types`**: [`InlineNode`] (Text, CodeSpan, LabelRef, ExampleRef,
//!   Superscript, Subscript)
//! - **`kinds`**: one type per construct owning its delimiters
//! - **`cursor`**: [`cursor::Cursor`] with absolute position tracking
//! - **`parser`**: [`parse_inline`] and the `try_parse_*` helpers; code spans
//!   parse through [`kinds::CodeSpan::parse`]
//!
//! Code spans take precedence: `` `\ref{x}` `` is a single CodeSpan. Both the
//! live inline processors and the reading renderer call [`parse_inline`], so
//! a construct is recognised identically in either mode.

pub mod cursor;
pub mod kinds;
pub mod parser;
pub mod types;

pub use parser::{InlineOptions, code_spans, parse_inline};
pub use types::InlineNode;
