use crate::parsing::{
    inline::{cursor::Cursor, types::InlineNode},
    rope::span::Span,
};

/// Backtick code span. Labels, references and scripts inside it are never
/// recognised, and the label scanners skip the same spans.
pub struct CodeSpan;

impl CodeSpan {
    pub const TICK: u8 = b'`';

    /// A run of N backticks closed by the next run of exactly N. Longer or
    /// shorter runs in between are content. On failure the cursor is left
    /// where it was.
    pub fn parse(cur: &mut Cursor<'_>) -> Option<InlineNode> {
        if cur.peek() != Some(Self::TICK) {
            return None;
        }

        let saved = cur.clone();
        let start = cur.pos();
        let run = cur.bump_while(|b| b == Self::TICK);
        let inner_start = cur.pos();

        while !cur.eof() {
            if cur.peek() == Some(Self::TICK) {
                let close_start = cur.pos();
                if cur.bump_while(|b| b == Self::TICK) == run {
                    return Some(InlineNode::CodeSpan {
                        full: Span::new(start, cur.pos()),
                        inner: Span::new(inner_start, close_start),
                    });
                }
            } else {
                cur.bump();
            }
        }

        *cur = saved;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("`(@a)` x", Some((0, 6)))]
    #[case("``a ` \\ref{b}`` x", Some((0, 15)))]
    #[case("`` (@a) `", None)]
    #[case("x`a`", None)]
    fn parses_a_raw_zone(#[case] s: &str, #[case] full: Option<(usize, usize)>) {
        let mut cur = Cursor::new(s, 40);
        let got = CodeSpan::parse(&mut cur).map(|n| n.span());
        assert_eq!(got, full.map(|(a, b)| Span::new(40 + a, 40 + b)));
        if full.is_none() {
            assert_eq!(cur.pos(), 40);
        }
    }
}
