/// A byte range `[start, end)` into the document text.
///
/// Tokens, records and decorations store spans rather than copied text, so
/// slicing the source with any span reproduces the exact bytes it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// True when `pos` lies inside the span. The end offset counts as inside
    /// so a caret sitting right after a marker still touches it.
    #[must_use]
    pub fn touches(self, pos: usize) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// True when the two spans share at least one byte.
    #[must_use]
    pub fn overlaps(self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Moves the span by a signed byte delta.
    #[must_use]
    pub fn shifted(self, delta: isize) -> Span {
        Span {
            start: self.start.saturating_add_signed(delta),
            end: self.end.saturating_add_signed(delta),
        }
    }

    /// Slices `text` with this span, clamping to its bounds.
    pub fn slice(self, text: &str) -> &str {
        let end = self.end.min(text.len());
        let start = self.start.min(end);
        text.get(start..end).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touches_includes_end() {
        let sp = Span::new(4, 8);
        assert!(sp.touches(4));
        assert!(sp.touches(8));
        assert!(!sp.touches(9));
    }

    #[test]
    fn overlap_is_exclusive_at_edges() {
        assert!(Span::new(0, 5).overlaps(Span::new(4, 6)));
        assert!(!Span::new(0, 5).overlaps(Span::new(5, 6)));
    }

    #[test]
    fn shifted_moves_both_ends() {
        assert_eq!(Span::new(10, 12).shifted(-3), Span::new(7, 9));
        assert_eq!(Span::new(10, 12).shifted(5), Span::new(15, 17));
    }

    #[test]
    fn slice_clamps_out_of_range() {
        assert_eq!(Span::new(2, 50).slice("hello"), "llo");
        assert_eq!(Span::new(9, 12).slice("hello"), "");
    }
}
