//! # List Renumbering Engine
//!
//! Pure functions from marker tokens to visible labels, shared by the live
//! pipeline and the reading renderer.
//!
//! - **`alphabet`**: decimal, bijective base-26 and roman formatting/parsing
//! - **`engine`**: [`renumber_run`] for one sibling run and
//!   [`renumber_document`] for a whole document's line entries

pub mod alphabet;
pub mod engine;

pub use engine::{
    Assignment, ContinuationLine, ListEntry, MAX_DEPTH, Numbering, renumber_document,
    renumber_run,
};
