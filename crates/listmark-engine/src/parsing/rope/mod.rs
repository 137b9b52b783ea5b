pub mod lines;
pub mod slice;
pub mod span;

pub use lines::{LineRef, lines_with_spans, split_lines};
pub use slice::{preview, slice_to_string};
pub use span::Span;
