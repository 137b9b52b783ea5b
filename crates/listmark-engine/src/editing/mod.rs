//! # Host document
//!
//! The editor buffer the live pipeline decorates: a single `xi_rope::Rope`
//! holding the exact bytes, edited only through [`Cmd`]s that compile to
//! deltas, with a tree-sitter markdown tree kept up to date incrementally.
//! The tree is the code-block detector for live mode.
//!
//! - **`document`**: [`Document`] (buffer, tree, selection, revision)
//! - **`commands`**: [`Cmd`] and its compilation to a delta
//! - **`patch`**: [`Patch`], what an applied command changed

pub mod commands;
pub mod document;
pub mod patch;

pub use commands::Cmd;
pub use document::Document;
pub use patch::Patch;
