use std::ops::Range;

use xi_rope::{Delta, Rope, RopeInfo, delta::Builder};

use crate::editing::Document;

/// Edits the host can apply to a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    InsertText { at: usize, text: String },
    DeleteRange { range: Range<usize> },
    ReplaceRange { range: Range<usize>, text: String },
    /// Adds `width` spaces at the start of every line touching `range`.
    IndentLines { range: Range<usize>, width: usize },
    /// Removes up to `width` leading spaces (or one tab) from every line
    /// touching `range`.
    OutdentLines { range: Range<usize>, width: usize },
}

fn clamp(range: &Range<usize>, len: usize) -> Range<usize> {
    let end = range.end.min(len);
    range.start.min(end)..end
}

pub(crate) fn compile_command(doc: &Document, cmd: &Cmd) -> Delta<RopeInfo> {
    let len = doc.len();
    let mut builder = Builder::new(len);
    match cmd {
        Cmd::InsertText { at, text } => {
            let at = (*at).min(len);
            builder.replace(at..at, Rope::from(text.as_str()));
        }
        Cmd::DeleteRange { range } => {
            builder.delete(clamp(range, len));
        }
        Cmd::ReplaceRange { range, text } => {
            builder.replace(clamp(range, len), Rope::from(text.as_str()));
        }
        Cmd::IndentLines { range, width } => {
            let pad = " ".repeat(*width);
            for (start, _) in lines_touching(doc, &clamp(range, len)) {
                builder.replace(start..start, Rope::from(pad.as_str()));
            }
        }
        Cmd::OutdentLines { range, width } => {
            let text = doc.text();
            for (start, end) in lines_touching(doc, &clamp(range, len)) {
                let remove = outdent_len(&text[start..end], *width);
                if remove > 0 {
                    builder.delete(start..start + remove);
                }
            }
        }
    }
    builder.build()
}

/// Leading bytes to drop when outdenting `line` by `width` columns.
fn outdent_len(line: &str, width: usize) -> usize {
    if line.starts_with('\t') {
        return 1;
    }
    line.bytes().take(width).take_while(|b| *b == b' ').count()
}

/// (start, end) of every line overlapping `range`, end excluding the newline.
fn lines_touching(doc: &Document, range: &Range<usize>) -> Vec<(usize, usize)> {
    let text = doc.text();
    let mut out = Vec::new();
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        let end = start + line.trim_end_matches('\n').len();
        if start <= range.end && end >= range.start {
            out.push((start, end));
        }
        start += line.len();
    }
    out
}

/// Moves a selection through the edit `cmd` describes.
pub(crate) fn transform_selection(
    doc: &Document,
    sel: &Range<usize>,
    cmd: &Cmd,
) -> Range<usize> {
    let len = doc.len();
    let shift = |pos: usize, at: usize, removed: usize, inserted: usize| -> usize {
        if pos <= at {
            pos
        } else if pos <= at + removed {
            at + inserted
        } else {
            pos - removed + inserted
        }
    };
    match cmd {
        Cmd::InsertText { at, text } => {
            let at = (*at).min(len);
            let grow = |pos: usize| if pos >= at { pos + text.len() } else { pos };
            grow(sel.start)..grow(sel.end)
        }
        Cmd::DeleteRange { range } => {
            let r = clamp(range, len);
            shift(sel.start, r.start, r.len(), 0)..shift(sel.end, r.start, r.len(), 0)
        }
        Cmd::ReplaceRange { range, text } => {
            let r = clamp(range, len);
            shift(sel.start, r.start, r.len(), text.len())
                ..shift(sel.end, r.start, r.len(), text.len())
        }
        Cmd::IndentLines { range, width } => {
            let starts = lines_touching(doc, &clamp(range, len));
            let moved = |pos: usize| pos + width * starts.iter().filter(|(s, _)| *s <= pos).count();
            moved(sel.start)..moved(sel.end)
        }
        Cmd::OutdentLines { range, width } => {
            let text = doc.text();
            let cuts: Vec<(usize, usize)> = lines_touching(doc, &clamp(range, len))
                .into_iter()
                .map(|(s, e)| (s, outdent_len(&text[s..e], *width)))
                .collect();
            let moved = |pos: usize| {
                cuts.iter()
                    .filter(|(s, _)| *s < pos)
                    .fold(pos, |p, (s, n)| p - (pos - s).min(*n))
            };
            moved(sel.start)..moved(sel.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::editing::{Cmd, Document};
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> Document {
        Document::from_bytes(text.as_bytes()).unwrap()
    }

    #[test]
    fn insert_text_in_middle() {
        let mut d = doc("1. a\n3. c\n");
        let patch = d.apply(Cmd::InsertText {
            at: 5,
            text: "2. b\n".into(),
        });
        assert_eq!(d.text(), "1. a\n2. b\n3. c\n");
        assert_eq!(patch.changed, vec![5..10]);
        assert_eq!(patch.revision, 1);
    }

    #[test]
    fn delete_range_across_lines() {
        let mut d = doc("1. a\n2. b\n3. c\n");
        d.apply(Cmd::DeleteRange { range: 5..10 });
        assert_eq!(d.text(), "1. a\n3. c\n");
    }

    #[test]
    fn replace_range() {
        let mut d = doc("(foo) x\n");
        d.apply(Cmd::ReplaceRange {
            range: 1..4,
            text: "bar".into(),
        });
        assert_eq!(d.text(), "(bar) x\n");
    }

    #[test]
    fn out_of_bounds_ranges_are_clamped() {
        let mut d = doc("abc");
        d.apply(Cmd::DeleteRange { range: 2..99 });
        assert_eq!(d.text(), "ab");
        d.apply(Cmd::InsertText {
            at: 99,
            text: "!".into(),
        });
        assert_eq!(d.text(), "ab!");
    }

    #[test]
    fn indent_and_outdent_lines() {
        let mut d = doc("1. a\n2. b\n");
        d.apply(Cmd::IndentLines {
            range: 0..6,
            width: 3,
        });
        assert_eq!(d.text(), "   1. a\n   2. b\n");
        d.apply(Cmd::OutdentLines {
            range: 0..1,
            width: 3,
        });
        assert_eq!(d.text(), "1. a\n   2. b\n");
    }

    #[test]
    fn selection_follows_edits() {
        let mut d = doc("hello world");
        d.set_selection(6..11);
        d.apply(Cmd::InsertText {
            at: 0,
            text: ">> ".into(),
        });
        assert_eq!(d.selection(), 9..14);
        d.apply(Cmd::DeleteRange { range: 0..3 });
        assert_eq!(d.selection(), 6..11);
        d.apply(Cmd::DeleteRange { range: 5..8 });
        assert_eq!(d.selection(), 5..8);
    }

    #[test]
    fn indent_moves_cursor_on_indented_line() {
        let mut d = doc("a\nb\n");
        d.set_selection(3..3);
        d.apply(Cmd::IndentLines {
            range: 0..3,
            width: 2,
        });
        assert_eq!(d.text(), "  a\n  b\n");
        assert_eq!(d.selection(), 7..7);
    }
}
