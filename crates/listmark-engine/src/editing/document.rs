use std::ops::Range;

use tree_sitter::{InputEdit, Parser, Point, Tree};
use tree_sitter_md::LANGUAGE;
use xi_rope::{Delta, Rope, RopeInfo, delta::DeltaElement};

use crate::{
    editing::{Cmd, Patch, commands},
    parsing::{
        code::CodeRegions,
        rope::{LineRef, Span, lines_with_spans, slice_to_string},
    },
};

/// The editor buffer.
///
/// Holds the exact document bytes in an `xi_rope::Rope` and a tree-sitter
/// markdown tree that is edited and reparsed incrementally after every
/// command. `revision` increases by one per applied command; the live
/// pipeline tags its passes with it.
pub struct Document {
    buffer: Rope,
    selection: Range<usize>,
    revision: u64,
    parser: Parser,
    tree: Option<Tree>,
}

impl Document {
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        let buffer = Rope::from(text);
        let len = buffer.len();

        let mut parser = Parser::new();
        parser.set_language(&LANGUAGE.into())?;
        let tree = parser.parse(text, None);

        Ok(Self {
            buffer,
            selection: len..len,
            revision: 0,
            parser,
            tree,
        })
    }

    /// Applies `cmd` and reparses incrementally.
    ///
    /// Input edits are expressed in old coordinates, so the old text is kept
    /// until the edit has been computed.
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        let delta = commands::compile_command(self, &cmd);
        let changed = inserted_ranges(&delta);
        let new_selection = commands::transform_selection(self, &self.selection, &cmd);

        let old_text = self.buffer.to_string();
        self.buffer = delta.apply(&self.buffer);
        let text = self.buffer.to_string();
        let edit = input_edit(&delta, &old_text, &text);
        self.tree = match (self.tree.take(), edit) {
            (Some(mut old), Some(edit)) => {
                old.edit(&edit);
                self.parser.parse(&text, Some(&old))
            }
            (Some(old), None) => Some(old),
            (None, _) => self.parser.parse(&text, None),
        };

        self.selection = new_selection.clone();
        self.revision += 1;
        log::trace!("applied {cmd:?}, now at revision {}", self.revision);

        Patch {
            changed,
            new_selection,
            revision: self.revision,
        }
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    pub fn set_selection(&mut self, selection: Range<usize>) {
        let len = self.len();
        self.selection = selection.start.min(len)..selection.end.min(len);
    }

    /// Caret position (end of the selection).
    pub fn cursor(&self) -> usize {
        self.selection.end
    }

    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.text().into_bytes()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn rope(&self) -> &Rope {
        &self.buffer
    }

    /// Text under `span`, clamped to the buffer.
    pub fn slice(&self, span: Span) -> String {
        slice_to_string(&self.buffer, span)
    }

    pub fn lines(&self) -> Vec<LineRef> {
        lines_with_spans(&self.buffer).collect()
    }

    /// Fenced code blocks according to the current tree.
    pub fn code_regions(&self) -> CodeRegions {
        self.tree
            .as_ref()
            .map(CodeRegions::from_tree)
            .unwrap_or_default()
    }

    /// Index of the line containing byte `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.buffer.line_of_offset(offset.min(self.len()))
    }

    /// Byte offset where line `line` starts (clamped to the end).
    pub fn offset_of_line(&self, line: usize) -> usize {
        let last = self.buffer.line_of_offset(self.len());
        self.buffer.offset_of_line(line.min(last))
    }
}

impl Clone for Document {
    fn clone(&self) -> Self {
        // Parser is not Clone; a fresh one reparses the buffer.
        let mut parser = Parser::new();
        let _ = parser.set_language(&LANGUAGE.into());
        let tree = parser.parse(self.buffer.to_string(), None);
        Self {
            buffer: self.buffer.clone(),
            selection: self.selection.clone(),
            revision: self.revision,
            parser,
            tree,
        }
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("len", &self.len())
            .field("selection", &self.selection)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

/// One input edit covering everything the delta touches: the unchanged
/// prefix and suffix are skipped, the middle is replaced.
fn input_edit(delta: &Delta<RopeInfo>, old_text: &str, new_text: &str) -> Option<InputEdit> {
    if delta.is_identity() {
        return None;
    }
    let base_len = delta.base_len;
    let prefix = match delta.els.first() {
        Some(DeltaElement::Copy(0, to)) => *to,
        _ => 0,
    };
    let suffix = match delta.els.last() {
        Some(DeltaElement::Copy(from, to)) if *to == base_len => base_len - from,
        _ => 0,
    };
    let old_end = (base_len - suffix).max(prefix);
    let new_end = new_text.len().saturating_sub(suffix).max(prefix);
    Some(InputEdit {
        start_byte: prefix,
        old_end_byte: old_end,
        new_end_byte: new_end,
        start_position: point_at(old_text, prefix),
        old_end_position: point_at(old_text, old_end),
        new_end_position: point_at(new_text, new_end),
    })
}

/// Ranges of inserted text in new coordinates.
fn inserted_ranges(delta: &Delta<RopeInfo>) -> Vec<Range<usize>> {
    let mut changed = Vec::new();
    let mut cursor = 0;
    for el in &delta.els {
        match el {
            DeltaElement::Copy(from, to) => cursor += to - from,
            DeltaElement::Insert(node) => {
                let len = node.len();
                changed.push(cursor..cursor + len);
                cursor += len;
            }
        }
    }
    changed
}

fn point_at(text: &str, byte: usize) -> Point {
    let byte = byte.min(text.len());
    let before = &text.as_bytes()[..byte];
    let row = before.iter().filter(|b| **b == b'\n').count();
    let line_start = before
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1);
    Point {
        row,
        column: byte - line_start,
    }
}
