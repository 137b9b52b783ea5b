//! Ranges the live pipeline decorates: runs of consecutive non-blank lines.

use std::{collections::BTreeSet, ops::Range};

use crate::{
    error::Diagnostic,
    labels::DefinitionSite,
    live::decoration::Decoration,
    parsing::{rope::span::Span, scan::LineScan},
};

/// `Unscanned → Scanning → Decorated → (Stale on edit) → Scanning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockState {
    Unscanned,
    Scanning,
    Decorated,
    Stale,
}

/// A label definition made inside a block, with the priority of the
/// processor that made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDefinition {
    pub id: String,
    pub site: DefinitionSite,
    pub priority: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub lines: Range<usize>,
    pub span: Span,
    pub state: BlockState,
    pub decorations: Vec<Decoration>,
    pub definitions: Vec<BlockDefinition>,
    /// Registry ids any reference in the block could resolve to.
    pub references: BTreeSet<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Block {
    pub fn new(lines: Range<usize>, span: Span) -> Self {
        Self {
            lines,
            span,
            state: BlockState::Unscanned,
            decorations: Vec::new(),
            definitions: Vec::new(),
            references: BTreeSet::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Copy moved by whole lines and bytes. Positions moving is not a
    /// reason to redecorate, so the state is kept.
    pub fn shifted(&self, lines: isize, bytes: isize) -> Block {
        let mut block = self.clone();
        block.lines = self.lines.start.saturating_add_signed(lines)
            ..self.lines.end.saturating_add_signed(lines);
        if bytes != 0 {
            block.span = self.span.shifted(bytes);
            for d in &mut block.decorations {
                d.span = d.span.shifted(bytes);
            }
            for def in &mut block.definitions {
                def.site.span = def.site.span.shifted(bytes);
            }
            for diag in &mut block.diagnostics {
                diag.span = diag.span.shifted(bytes);
            }
        }
        block
    }

    pub fn mark_stale(&mut self) {
        if self.state == BlockState::Decorated {
            self.state = BlockState::Stale;
        }
    }

    pub fn needs_work(&self) -> bool {
        matches!(self.state, BlockState::Unscanned | BlockState::Stale)
    }

    pub fn mentions(&self, id: &str) -> bool {
        self.references.contains(id) || self.definitions.iter().any(|d| d.id == id)
    }
}

/// Line ranges and byte spans of the non-blank runs in `lines`.
pub fn partition(lines: &[LineScan]) -> Vec<(Range<usize>, Span)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, line) in lines.iter().enumerate() {
        match (line.blank, start) {
            (false, None) => start = Some(i),
            (true, Some(s)) => {
                out.push(block_at(lines, s..i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push(block_at(lines, s..lines.len()));
    }
    out
}

fn block_at(lines: &[LineScan], range: Range<usize>) -> (Range<usize>, Span) {
    let span = Span::new(
        lines[range.start].line.content.start,
        lines[range.end - 1].line.content.end,
    );
    (range, span)
}
