//! Inline construct types. Each owns its delimiters; the parser never
//! hardcodes them.

pub mod code_span;
pub mod example_ref;
pub mod label_ref;
pub mod script;

pub use code_span::CodeSpan;
pub use example_ref::ExampleRef;
pub use label_ref::LabelRef;
pub use script::{Subscript, Superscript};
