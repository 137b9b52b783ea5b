use std::ops::Range;

/// Result of applying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Byte ranges of inserted text, in new-document coordinates.
    pub changed: Vec<Range<usize>>,
    pub new_selection: Range<usize>,
    /// Document revision after the edit.
    pub revision: u64,
}
