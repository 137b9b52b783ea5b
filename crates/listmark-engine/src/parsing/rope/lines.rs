use xi_rope::Rope;

use super::span::Span;

/// A reference to a single line of the document with its byte spans.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineRef {
    /// Byte span of this line including its newline, if any.
    pub span: Span,
    /// Byte span of the line text without the trailing `\n` / `\r\n`.
    pub content: Span,
    /// The line text without its line ending.
    pub text: String,
}

impl LineRef {
    fn new(start: usize, raw: &str) -> Self {
        let text = raw.trim_end_matches(['\r', '\n']);
        LineRef {
            span: Span::new(start, start + raw.len()),
            content: Span::new(start, start + text.len()),
            text: text.to_string(),
        }
    }

    /// Whether the line is whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Returns the lines of a rope with their byte spans.
///
/// Uses `lines_raw` to preserve newline characters, which keeps the spans of
/// consecutive lines contiguous.
pub fn lines_with_spans(rope: &Rope) -> impl Iterator<Item = LineRef> + '_ {
    let mut offset = 0usize;
    rope.lines_raw(..).map(move |line| {
        let start = offset;
        offset += line.len();
        LineRef::new(start, &line)
    })
}

/// Same as [`lines_with_spans`] for a plain string (reading mode input).
pub fn split_lines(text: &str) -> Vec<LineRef> {
    let mut out = Vec::new();
    let mut offset = 0usize;
    for raw in text.split_inclusive('\n') {
        out.push(LineRef::new(offset, raw));
        offset += raw.len();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rope_and_str_lines_agree() {
        let text = "1. one\r\n2. two\n\nlast";
        let from_rope: Vec<_> = lines_with_spans(&Rope::from(text)).collect();
        assert_eq!(from_rope, split_lines(text));
    }

    #[test]
    fn content_span_excludes_line_ending() {
        let lines = split_lines("ab\r\ncd");
        assert_eq!(lines[0].span, Span::new(0, 4));
        assert_eq!(lines[0].content, Span::new(0, 2));
        assert_eq!(lines[1].content, Span::new(4, 6));
        assert_eq!(lines[1].text, "cd");
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(split_lines("").is_empty());
    }
}
