use crate::{parsing::rope::span::Span, settings::InlineSettings};

use super::{
    cursor::Cursor,
    kinds::{CodeSpan, ExampleRef, LabelRef, Subscript, Superscript},
    types::InlineNode,
};

/// Which optional constructs are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineOptions {
    pub superscript: bool,
    pub subscript: bool,
}

impl Default for InlineOptions {
    fn default() -> Self {
        Self {
            superscript: true,
            subscript: true,
        }
    }
}

impl From<&InlineSettings> for InlineOptions {
    fn from(s: &InlineSettings) -> Self {
        Self {
            superscript: s.superscript,
            subscript: s.subscript,
        }
    }
}

/// Parses `s` (starting at absolute offset `base`) into inline nodes that
/// cover the whole input. Text between constructs becomes `Text`.
///
/// Code spans are tried first and suppress everything inside them. A
/// backslash before ASCII punctuation escapes it, so `\^` never opens a
/// superscript and `\(@a)` is not a reference.
pub fn parse_inline(base: usize, s: &str, opts: InlineOptions) -> Vec<InlineNode> {
    let mut cur = Cursor::new(s, base);
    let mut out = vec![];
    let mut text_start = cur.pos();

    fn flush_text(out: &mut Vec<InlineNode>, start: usize, end: usize) {
        if end > start {
            out.push(InlineNode::Text(Span { start, end }));
        }
    }

    while !cur.eof() {
        let node = CodeSpan::parse(&mut cur)
            .or_else(|| try_parse_label_ref(&mut cur))
            .or_else(|| try_parse_example_ref(&mut cur))
            .or_else(|| {
                opts.superscript
                    .then(|| try_parse_script(&mut cur, Superscript::DELIM))
                    .flatten()
            })
            .or_else(|| {
                opts.subscript
                    .then(|| try_parse_script(&mut cur, Subscript::DELIM))
                    .flatten()
            });
        if let Some(node) = node {
            flush_text(&mut out, text_start, node.span().start);
            text_start = node.span().end;
            out.push(node);
            continue;
        }
        skip_plain(&mut cur);
    }

    flush_text(&mut out, text_start, cur.pos());
    out
}

/// Spans of the code spans in `s`, for scanners that must treat them as raw.
pub fn code_spans(base: usize, s: &str) -> Vec<Span> {
    if !s.as_bytes().contains(&CodeSpan::TICK) {
        return Vec::new();
    }
    let mut cur = Cursor::new(s, base);
    let mut out = Vec::new();
    while !cur.eof() {
        match CodeSpan::parse(&mut cur) {
            Some(node) => out.push(node.span()),
            None => skip_plain(&mut cur),
        }
    }
    out
}

/// Consumes one byte of plain text, or an escape pair, or a whole run of
/// tildes (so `~~` can never contribute a subscript delimiter).
fn skip_plain(cur: &mut Cursor<'_>) {
    match cur.peek() {
        Some(b'\\') if !cur.starts_with(LabelRef::OPEN) => {
            cur.bump();
            if cur.peek().is_some_and(|b| b.is_ascii_punctuation()) {
                cur.bump();
            }
        }
        Some(Subscript::DELIM) => {
            cur.bump_while(|b| b == Subscript::DELIM);
        }
        Some(CodeSpan::TICK) => {
            // An unclosed run stays literal as a whole.
            cur.bump_while(|b| b == CodeSpan::TICK);
        }
        _ => {
            cur.bump();
        }
    }
}

fn try_parse_label_ref(cur: &mut Cursor<'_>) -> Option<InlineNode> {
    if !cur.starts_with(LabelRef::OPEN) {
        return None;
    }

    let saved = cur.clone();
    let start = cur.pos();
    cur.bump_n(LabelRef::OPEN.len());
    let label_start = cur.pos();
    cur.bump_while(|b| b != LabelRef::CLOSE && b != b'\n');
    let label_end = cur.pos();

    if cur.peek() != Some(LabelRef::CLOSE) || label_end == label_start {
        *cur = saved;
        return None;
    }
    cur.bump();

    Some(InlineNode::LabelRef {
        full: Span::new(start, cur.pos()),
        label: Span::new(label_start, label_end),
    })
}

fn try_parse_example_ref(cur: &mut Cursor<'_>) -> Option<InlineNode> {
    if !cur.starts_with(ExampleRef::OPEN) {
        return None;
    }

    let saved = cur.clone();
    let start = cur.pos();
    cur.bump_n(ExampleRef::OPEN.len());
    let label_start = cur.pos();
    cur.bump_while(ExampleRef::is_label_byte);
    let label_end = cur.pos();

    if cur.peek() != Some(ExampleRef::CLOSE) || label_end == label_start {
        *cur = saved;
        return None;
    }
    cur.bump();

    Some(InlineNode::ExampleRef {
        full: Span::new(start, cur.pos()),
        label: Span::new(label_start, label_end),
    })
}

/// `^x^` or `~x~`: non-empty, no unescaped whitespace. For `~`, a doubled
/// delimiter on either side disqualifies the run.
fn try_parse_script(cur: &mut Cursor<'_>, delim: u8) -> Option<InlineNode> {
    if cur.peek() != Some(delim) {
        return None;
    }
    if delim == Subscript::DELIM && cur.peek_at(1) == Some(Subscript::DELIM) {
        return None;
    }

    let saved = cur.clone();
    let start = cur.pos();
    cur.bump();
    let inner_start = cur.pos();

    loop {
        match cur.peek() {
            None => break,
            Some(b) if b == delim => break,
            Some(b'\\') => {
                cur.bump();
                if cur.bump().is_none() {
                    break;
                }
            }
            Some(b) if b.is_ascii_whitespace() => break,
            Some(_) => {
                cur.bump();
            }
        }
    }
    let inner_end = cur.pos();

    let closed = cur.peek() == Some(delim);
    let doubled_close = delim == Subscript::DELIM && cur.peek_at(1) == Some(Subscript::DELIM);
    if !closed || doubled_close || inner_end == inner_start {
        *cur = saved;
        return None;
    }
    cur.bump();

    let full = Span::new(start, cur.pos());
    let inner = Span::new(inner_start, inner_end);
    Some(if delim == Superscript::DELIM {
        InlineNode::Superscript { full, inner }
    } else {
        InlineNode::Subscript { full, inner }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(s: &str) -> Vec<InlineNode> {
        parse_inline(0, s, InlineOptions::default())
    }

    #[test]
    fn plain_text_is_one_node() {
        assert_eq!(parse("hello world"), vec![InlineNode::Text(Span::new(0, 11))]);
    }

    #[test]
    fn label_ref_in_sentence() {
        let nodes = parse("see \\ref{foo} now");
        assert_eq!(
            nodes,
            vec![
                InlineNode::Text(Span::new(0, 4)),
                InlineNode::LabelRef {
                    full: Span::new(4, 13),
                    label: Span::new(9, 12),
                },
                InlineNode::Text(Span::new(13, 17)),
            ]
        );
    }

    #[test]
    fn example_ref_needs_a_label() {
        let nodes = parse("(@good) and (@)");
        assert!(matches!(
            nodes[0],
            InlineNode::ExampleRef {
                label: Span { start: 2, end: 6 },
                ..
            }
        ));
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn superscript_and_subscript() {
        let nodes = parse("x^2^ and H~2~O");
        assert!(matches!(
            nodes[1],
            InlineNode::Superscript {
                inner: Span { start: 2, end: 3 },
                ..
            }
        ));
        assert!(matches!(nodes[3], InlineNode::Subscript { .. }));
    }

    #[test]
    fn whitespace_prevents_scripts() {
        assert!(parse("a ^b c^ d").iter().all(InlineNode::is_text));
        assert!(parse("a ~b c~ d").iter().all(InlineNode::is_text));
    }

    #[test]
    fn escaped_space_is_allowed_inside_script() {
        let nodes = parse("^a\\ b^");
        assert!(matches!(nodes[0], InlineNode::Superscript { .. }));
    }

    #[test]
    fn strikethrough_is_never_subscript() {
        assert!(parse("~~struck~~").iter().all(InlineNode::is_text));
        assert!(parse("~a~~").iter().all(InlineNode::is_text));
    }

    #[test]
    fn code_span_suppresses_everything() {
        let nodes = parse("`\\ref{x} ^2^ (@a)`");
        assert_eq!(nodes.len(), 1);
        assert!(matches!(nodes[0], InlineNode::CodeSpan { .. }));
    }

    #[test]
    fn double_backtick_span_contains_single_tick() {
        let nodes = parse("``a ` b`` ^x^");
        assert!(matches!(
            nodes[0],
            InlineNode::CodeSpan {
                full: Span { start: 0, end: 9 },
                ..
            }
        ));
        assert!(matches!(nodes[2], InlineNode::Superscript { .. }));
    }

    #[test]
    fn escapes_suppress_constructs() {
        assert!(parse("\\^not\\^ \\(@a)").iter().all(InlineNode::is_text));
    }

    #[test]
    fn disabled_scripts_stay_text() {
        let opts = InlineOptions {
            superscript: false,
            subscript: false,
        };
        assert!(parse_inline(0, "^a^ ~b~", opts).iter().all(InlineNode::is_text));
    }

    #[test]
    fn unclosed_constructs_become_text() {
        assert!(parse("\\ref{open ^a `b").iter().all(InlineNode::is_text));
        assert!(parse("\\ref{}").iter().all(InlineNode::is_text));
    }

    #[test]
    fn code_spans_report_absolute_spans() {
        assert_eq!(code_spans(100, "a `b` c"), vec![Span::new(102, 105)]);
        assert!(code_spans(0, "no ticks").is_empty());
    }

    #[test]
    fn nodes_cover_input() {
        let s = "pre \\ref{a} mid (@b) ^c^ ~d~ `e` post";
        let nodes = parse(s);
        let mut pos = 0;
        for n in &nodes {
            assert_eq!(n.span().start, pos);
            pos = n.span().end;
        }
        assert_eq!(pos, s.len());
    }
}
