//! The incremental live pipeline.
//!
//! A pass is computed against an immutable pipeline and a document snapshot
//! ([`LivePipeline::begin_pass`]) and only takes effect through
//! [`LivePipeline::commit`], which refuses passes computed for a revision the
//! document has already left.

use std::{
    collections::{BTreeSet, HashMap},
    ops::Range,
};

use crate::{
    editing::Document,
    error::{Diagnostic, PipelineError, SettingsError},
    labels::{LabelKind, LabelRegistry, definition_of},
    live::{
        blocks::{Block, BlockDefinition, BlockState, partition},
        decoration::{BlockUpdate, Decoration, DecorationDiff, MarkKind},
        registry::{InlineContext, LineContext, ProcessorKind, ProcessorRegistry},
    },
    parsing::{
        analysis::{Analysis, LineRole, analyze},
        inline::{InlineOptions, parse_inline},
        rope::{lines::LineRef, span::Span},
        scan::{LineScan, ScanState, scan_one},
    },
    settings::{ProcessingConfig, Settings},
};

/// Follow-up rounds for registry changes within one pass.
const MAX_ROUNDS: usize = 4;

/// State as of the last commit.
#[derive(Debug, Clone)]
struct Committed {
    revision: u64,
    analysis: Analysis,
    /// `states[i]` is the scan state before line `i`, plus one final entry.
    states: Vec<ScanState>,
    blocks: Vec<Block>,
    registry: LabelRegistry,
    cursor: Option<usize>,
}

impl Committed {
    fn empty() -> Self {
        Self {
            revision: 0,
            analysis: Analysis::default(),
            states: vec![ScanState::default()],
            blocks: Vec::new(),
            registry: LabelRegistry::new(),
            cursor: None,
        }
    }

    fn text_len(&self) -> usize {
        self.analysis.lines.last().map_or(0, |l| l.line.span.end)
    }
}

/// The edited line region between the committed lines and the current ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineEdit {
    /// Lines before this index are unchanged.
    start: usize,
    /// End of the edited region in old line numbers.
    old_end: usize,
    /// End of the edited region in new line numbers.
    new_end: usize,
    /// Byte shift of everything after the region.
    delta: isize,
    /// Old byte offset where the unchanged tail starts.
    old_tail: usize,
}

impl LineEdit {
    fn between(old: &Committed, new: &[LineRef], flags: &[bool], new_len: usize) -> Self {
        let old_lines = &old.analysis.lines;
        let keep = |o: &LineScan, i: usize| {
            o.line.text == new[i].text
                && o.line.span.len() == new[i].span.len()
                && o.in_code == flags.get(i).copied().unwrap_or(false)
        };
        let max = old_lines.len().min(new.len());
        let mut start = 0;
        while start < max && keep(&old_lines[start], start) {
            start += 1;
        }
        let mut tail = 0;
        while tail < max - start
            && keep(&old_lines[old_lines.len() - 1 - tail], new.len() - 1 - tail)
        {
            tail += 1;
        }
        Self::region(old, start, old_lines.len() - tail, new.len() - tail, new_len)
    }

    /// Everything is edited.
    fn everything(old: &Committed, new_lines: usize, new_len: usize) -> Self {
        Self::region(old, 0, old.analysis.lines.len(), new_lines, new_len)
    }

    fn region(old: &Committed, start: usize, old_end: usize, new_end: usize, new_len: usize) -> Self {
        let old_len = old.text_len();
        Self {
            start,
            old_end,
            new_end,
            delta: new_len as isize - old_len as isize,
            old_tail: old
                .analysis
                .lines
                .get(old_end)
                .map_or(old_len, |l| l.line.span.start),
        }
    }

    /// Old index of a new line outside the edited region.
    fn old_line(&self, new: usize) -> Option<usize> {
        if new < self.start {
            Some(new)
        } else if new >= self.new_end {
            Some(new - self.new_end + self.old_end)
        } else {
            None
        }
    }

    fn line_delta(&self) -> isize {
        self.new_end as isize - self.old_end as isize
    }

    /// Maps an old byte offset into the new text, if it survived.
    fn map_offset(&self, old: usize, old_edit_start: usize) -> Option<usize> {
        if old < old_edit_start {
            Some(old)
        } else if old >= self.old_tail {
            Some(old.saturating_add_signed(self.delta))
        } else {
            None
        }
    }
}

/// What one pass did, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassStats {
    pub rescanned_lines: usize,
    pub processed_blocks: usize,
    /// Blocks outside the edit whose numbering changed.
    pub cascaded_blocks: usize,
    /// Blocks left stale for a later pass.
    pub deferred_blocks: usize,
    pub rounds: usize,
}

/// A computed but not yet committed pass.
#[derive(Debug, Clone)]
pub struct PendingPass {
    revision: u64,
    full: bool,
    state: Committed,
    diff: DecorationDiff,
    stats: PassStats,
}

impl PendingPass {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn stats(&self) -> &PassStats {
        &self.stats
    }

    pub fn diff(&self) -> &DecorationDiff {
        &self.diff
    }
}

/// Incrementally decorates a [`Document`] for a live editor.
///
/// The host feeds it the document after edits, the visible line range and
/// the cursor; it answers with decoration diffs. Blocks outside the viewport
/// are only decorated once they scroll into view, except for a bounded
/// window of blocks whose numbering changed because of an edit above them.
#[derive(Debug)]
pub struct LivePipeline {
    config: ProcessingConfig,
    processors: ProcessorRegistry,
    committed: Option<Committed>,
    viewport: Range<usize>,
    cursor: Option<usize>,
    rescan_all: bool,
}

impl Default for LivePipeline {
    fn default() -> Self {
        Self::new(ProcessingConfig::default())
    }
}

impl LivePipeline {
    pub fn new(config: ProcessingConfig) -> Self {
        Self::with_processors(config, ProcessorRegistry::with_defaults())
    }

    pub fn with_processors(config: ProcessingConfig, processors: ProcessorRegistry) -> Self {
        Self {
            config,
            processors,
            committed: None,
            viewport: 0..usize::MAX,
            cursor: None,
            rescan_all: false,
        }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Replaces the settings; the next pass rescans everything.
    pub fn set_settings(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        self.config = settings.compile()?;
        self.rescan_all = true;
        Ok(())
    }

    /// Visible lines, end exclusive.
    pub fn set_viewport(&mut self, lines: Range<usize>) {
        self.viewport = lines;
    }

    pub fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor;
    }

    /// Revision of the last committed pass.
    pub fn revision(&self) -> Option<u64> {
        self.committed.as_ref().map(|c| c.revision)
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.committed.as_ref().map(|c| &c.analysis)
    }

    pub fn registry(&self) -> Option<&LabelRegistry> {
        self.committed.as_ref().map(|c| &c.registry)
    }

    pub fn blocks(&self) -> &[Block] {
        self.committed.as_ref().map_or(&[], |c| c.blocks.as_slice())
    }

    /// Every current decoration in document order.
    pub fn decorations(&self) -> Vec<Decoration> {
        self.blocks()
            .iter()
            .flat_map(|b| b.decorations.iter().cloned())
            .collect()
    }

    /// Analysis, processor and duplicate-label diagnostics, by position.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let Some(c) = &self.committed else {
            return Vec::new();
        };
        let mut out: Vec<Diagnostic> = c
            .analysis
            .diagnostics
            .iter()
            .cloned()
            .chain(c.blocks.iter().flat_map(|b| b.diagnostics.iter().cloned()))
            .chain(c.registry.duplicate_diagnostics())
            .collect();
        out.sort_by_key(|d| (d.span.start, d.span.end));
        out
    }

    /// Computes a pass for the document as it is now. Nothing changes until
    /// the pass is committed.
    pub fn begin_pass(&self, doc: &Document) -> PendingPass {
        let empty;
        let old = match &self.committed {
            Some(c) => c,
            None => {
                empty = Committed::empty();
                &empty
            }
        };

        let lines = doc.lines();
        let flags = doc.code_regions().line_flags(&lines);
        let full = self.rescan_all || self.committed.is_none();
        let edit = if full {
            LineEdit::everything(old, lines.len(), doc.len())
        } else {
            LineEdit::between(old, &lines, &flags, doc.len())
        };

        let rescan = rescan(old, &lines, &flags, &edit, &self.config);
        let analysis = analyze(rescan.lines, &self.config);

        let mut pass = PassBuilder {
            config: &self.config,
            processors: &self.processors,
            old,
            edit,
            revision: doc.revision(),
            cursor: self.cursor,
            analysis,
            blocks: Vec::new(),
            previous: Vec::new(),
            removed: Vec::new(),
            forced: BTreeSet::new(),
            stats: PassStats {
                rescanned_lines: rescan.rescanned,
                ..PassStats::default()
            },
        };
        pass.map_blocks();
        let cascaded = pass.detect_cascades(&rescan.reshaped);
        pass.touch_cursor();

        let margin = self.config.settings().live.viewport_margin;
        let view = self.viewport.start.saturating_sub(margin)..self.viewport.end.saturating_add(margin);
        let window = self.config.settings().live.cascade_window;
        let (registry, diff) = pass.run(&view, &cascaded, window);

        let stats = pass.stats.clone();
        log::debug!(
            "pass for revision {}: rescanned {} lines, processed {} blocks, {} cascaded, {} deferred",
            pass.revision,
            stats.rescanned_lines,
            stats.processed_blocks,
            stats.cascaded_blocks,
            stats.deferred_blocks
        );

        PendingPass {
            revision: pass.revision,
            full,
            state: Committed {
                revision: pass.revision,
                analysis: pass.analysis,
                states: rescan.states,
                blocks: pass.blocks,
                registry,
                cursor: self.cursor,
            },
            diff,
            stats,
        }
    }

    /// Installs `pass` if it was computed for the document's current
    /// revision.
    pub fn commit(&mut self, pass: PendingPass, doc: &Document) -> Result<DecorationDiff, PipelineError> {
        let current = doc.revision();
        if pass.revision != current {
            log::debug!("discarding pass for revision {}, document is at {current}", pass.revision);
            return Err(PipelineError::StaleRevision {
                pass: pass.revision,
                current,
            });
        }
        if let Some(committed) = &self.committed
            && committed.revision > pass.revision
        {
            return Err(PipelineError::StaleRevision {
                pass: pass.revision,
                current: committed.revision,
            });
        }
        if pass.full {
            self.rescan_all = false;
        }
        self.committed = Some(pass.state);
        Ok(pass.diff)
    }

    /// `begin_pass` and `commit` in one go.
    pub fn process(&mut self, doc: &Document) -> Result<DecorationDiff, PipelineError> {
        let pass = self.begin_pass(doc);
        self.commit(pass, doc)
    }
}

struct Rescan {
    lines: Vec<LineScan>,
    states: Vec<ScanState>,
    rescanned: usize,
    /// New lines after the edit whose scan result changed.
    reshaped: Vec<usize>,
}

/// Scans the edited lines and continues until the scan state matches the
/// committed state at the same (shifted) line; from there the committed
/// scans are reused.
fn rescan(
    old: &Committed,
    lines: &[LineRef],
    flags: &[bool],
    edit: &LineEdit,
    config: &ProcessingConfig,
) -> Rescan {
    let old_lines = &old.analysis.lines;
    let mut out = Rescan {
        lines: old_lines[..edit.start].to_vec(),
        states: old.states[..edit.start].to_vec(),
        rescanned: 0,
        reshaped: Vec::new(),
    };
    let mut state = old.states[edit.start].clone();

    for (i, line) in lines.iter().enumerate().skip(edit.start) {
        let old_index = edit.old_line(i);
        if let Some(j) = old_index
            && old.states[j] == state
        {
            out.lines
                .extend(old_lines[j..].iter().map(|l| l.shifted(edit.delta)));
            out.states.extend(old.states[j..].iter().cloned());
            return out;
        }
        out.states.push(state.clone());
        let scan = scan_one(line, flags.get(i).copied().unwrap_or(false), &mut state, config);
        if let Some(j) = old_index
            && !old_lines[j].same_shape(&scan)
        {
            out.reshaped.push(i);
        }
        out.lines.push(scan);
        out.rescanned += 1;
    }
    out.states.push(state);
    out
}

/// Role with indices erased, so lines compare by how they look.
fn role_shape(role: LineRole) -> LineRole {
    match role {
        LineRole::Item { .. } => LineRole::Item { record: 0 },
        LineRole::Continuation { depth, .. } => LineRole::Continuation { record: 0, depth },
        LineRole::DefinitionTerm { .. } => LineRole::DefinitionTerm { group: 0 },
        LineRole::DefinitionMarker { .. } => LineRole::DefinitionMarker { group: 0 },
        LineRole::DefinitionContinuation { .. } => LineRole::DefinitionContinuation { group: 0 },
        other => other,
    }
}

fn same_look(old: &Analysis, o: usize, new: &Analysis, n: usize) -> bool {
    let role = |a: &Analysis, i: usize| a.roles.get(i).copied().map(role_shape);
    role(old, o) == role(new, n)
        && old.record_at_line(o).map(|r| r.visual_key()) == new.record_at_line(n).map(|r| r.visual_key())
}

/// Ids whose definition sites differ in what they show.
fn changed_ids(before: &LabelRegistry, after: &LabelRegistry) -> BTreeSet<String> {
    let shape = |r: &LabelRegistry, id: &str| {
        r.sites(id)
            .iter()
            .map(|s| (s.display.clone(), s.stale))
            .collect::<Vec<_>>()
    };
    before
        .ids()
        .chain(after.ids())
        .filter(|id| shape(before, id) != shape(after, id))
        .map(str::to_string)
        .collect()
}

struct PassBuilder<'p> {
    config: &'p ProcessingConfig,
    processors: &'p ProcessorRegistry,
    old: &'p Committed,
    edit: LineEdit,
    revision: u64,
    cursor: Option<usize>,
    analysis: Analysis,
    blocks: Vec<Block>,
    /// Decorations each block had before the pass, shifted; `None` for new
    /// blocks.
    previous: Vec<Option<Vec<Decoration>>>,
    removed: Vec<Span>,
    /// Blocks processed whatever the viewport says.
    forced: BTreeSet<usize>,
    stats: PassStats,
}

impl PassBuilder<'_> {
    /// Rebuilds the block list, carrying over blocks that lie entirely
    /// before or after the edited region.
    fn map_blocks(&mut self) {
        let edit = self.edit;
        let index: HashMap<(usize, usize), usize> = self
            .old
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| ((b.lines.start, b.lines.end), i))
            .collect();
        let mut used = vec![false; self.old.blocks.len()];

        for (range, span) in partition(&self.analysis.lines) {
            let key = if range.end <= edit.start {
                Some(((range.start, range.end), 0, 0))
            } else if range.start >= edit.new_end {
                let back = |l: usize| l - edit.new_end + edit.old_end;
                Some(((back(range.start), back(range.end)), edit.line_delta(), edit.delta))
            } else {
                None
            };
            let carried = key.and_then(|(k, lines, bytes)| index.get(&k).map(|&i| (i, lines, bytes)));
            match carried {
                Some((i, lines, bytes)) => {
                    used[i] = true;
                    let mut block = self.old.blocks[i].shifted(lines, bytes);
                    block.span = span;
                    self.previous.push(Some(block.decorations.clone()));
                    self.blocks.push(block);
                }
                None => {
                    self.previous.push(None);
                    self.blocks.push(Block::new(range, span));
                }
            }
        }

        self.removed = self
            .old
            .blocks
            .iter()
            .zip(&used)
            .filter(|(b, used)| !**used && !b.decorations.is_empty())
            .map(|(b, _)| b.span)
            .collect();
    }

    /// Marks carried blocks stale when any of their lines now looks
    /// different. Returns the indices of those blocks.
    fn detect_cascades(&mut self, reshaped: &[usize]) -> Vec<usize> {
        let mut cascaded = Vec::new();
        for (bi, block) in self.blocks.iter_mut().enumerate() {
            if self.previous[bi].is_none() {
                continue;
            }
            let changed = block.lines.clone().any(|i| {
                reshaped.binary_search(&i).is_ok()
                    || match self.edit.old_line(i) {
                        Some(o) => !same_look(&self.old.analysis, o, &self.analysis, i),
                        None => true,
                    }
            });
            if changed {
                block.mark_stale();
                cascaded.push(bi);
            }
        }
        self.stats.cascaded_blocks = cascaded.len();
        cascaded
    }

    fn block_at_offset(&self, offset: usize) -> Option<usize> {
        self.blocks.iter().position(|b| b.span.touches(offset))
    }

    /// Cursor moves redecorate the blocks under the old and the new cursor;
    /// the cursor's block is always processed.
    fn touch_cursor(&mut self) {
        let old_edit_start = self
            .old
            .analysis
            .lines
            .get(self.edit.start)
            .map_or(self.old.text_len(), |l| l.line.span.start);
        let old_cursor = self
            .old
            .cursor
            .and_then(|c| self.edit.map_offset(c, old_edit_start));
        let moved = self.old.cursor != self.cursor;

        for pos in [old_cursor, self.cursor].into_iter().flatten() {
            if let Some(bi) = self.block_at_offset(pos) {
                if moved {
                    self.blocks[bi].mark_stale();
                }
                self.forced.insert(bi);
            }
        }
    }

    fn in_scope(&self, bi: usize, view: &Range<usize>) -> bool {
        let lines = &self.blocks[bi].lines;
        self.forced.contains(&bi) || (lines.start < view.end && lines.end > view.start)
    }

    /// Decorates what is in scope, following registry changes for a bounded
    /// number of rounds.
    fn run(
        &mut self,
        view: &Range<usize>,
        cascaded: &[usize],
        window: usize,
    ) -> (LabelRegistry, DecorationDiff) {
        let mut queue: BTreeSet<usize> = (0..self.blocks.len())
            .filter(|&bi| self.blocks[bi].needs_work() && self.in_scope(bi, view))
            .collect();
        queue.extend(
            cascaded
                .iter()
                .copied()
                .filter(|&bi| self.blocks[bi].lines.start >= self.edit.new_end)
                .take(window),
        );

        let mut registry = self.collect_registry();
        let mut changed = changed_ids(&self.old.registry, &registry);
        let mut done = BTreeSet::new();
        let mut fresh = BTreeSet::new();

        loop {
            for bi in 0..self.blocks.len() {
                if queue.contains(&bi) || fresh.contains(&bi) {
                    continue;
                }
                if changed.iter().any(|id| self.blocks[bi].mentions(id)) {
                    self.blocks[bi].mark_stale();
                    if self.in_scope(bi, view) {
                        queue.insert(bi);
                    }
                }
            }
            if queue.is_empty() || self.stats.rounds == MAX_ROUNDS {
                break;
            }
            self.stats.rounds += 1;

            let work: Vec<(usize, Vec<(usize, usize)>)> = queue
                .iter()
                .map(|&bi| (bi, self.structural(bi)))
                .collect();
            let next = self.collect_registry();
            changed = changed_ids(&registry, &next);
            registry = next;
            for (bi, lines) in work {
                self.inline(bi, &lines, &registry);
            }
            done.extend(queue.iter().copied());
            fresh = std::mem::take(&mut queue);
        }
        if !queue.is_empty() {
            log::debug!("{} blocks left stale after {MAX_ROUNDS} rounds", queue.len());
        }

        let duplicates = registry.duplicate_spans();
        let mut diff = DecorationDiff {
            revision: self.revision,
            shift: (self.edit.delta != 0).then_some((self.edit.old_tail, self.edit.delta)),
            removed: std::mem::take(&mut self.removed),
            updated: Vec::new(),
        };
        for &bi in &done {
            let block = &mut self.blocks[bi];
            block.decorations.extend(
                duplicates
                    .iter()
                    .filter(|sp| block.span.start <= sp.start && sp.end <= block.span.end)
                    .map(|sp| Decoration::mark(*sp, MarkKind::DuplicateLabel)),
            );
            block.decorations.sort_by_key(|d| (d.span.start, d.span.end));
            if self.previous[bi].as_deref().unwrap_or(&[]) != block.decorations.as_slice() {
                diff.updated.push(BlockUpdate {
                    span: block.span,
                    decorations: block.decorations.clone(),
                });
            }
        }

        self.stats.processed_blocks = done.len();
        self.stats.deferred_blocks = self
            .blocks
            .iter()
            .filter(|b| b.state == BlockState::Stale)
            .count();
        (registry, diff)
    }

    /// Registry as the blocks currently see it: processed blocks contribute
    /// what their processors reported, unscanned ones what the analysis
    /// says, flagged stale. Applied priority-then-position.
    fn collect_registry(&self) -> LabelRegistry {
        let priority = |kind: LabelKind| {
            let processor = match kind {
                LabelKind::Custom => ProcessorKind::CustomLabel,
                LabelKind::Example => ProcessorKind::Example,
            };
            self.processors.priority_of(processor).unwrap_or(u32::MAX)
        };

        let mut updates: Vec<BlockDefinition> = Vec::new();
        for block in &self.blocks {
            if block.state == BlockState::Unscanned {
                for line in block.lines.clone() {
                    if let Some((id, mut site)) =
                        self.analysis.record_at_line(line).and_then(definition_of)
                    {
                        site.stale = true;
                        updates.push(BlockDefinition {
                            priority: priority(site.kind),
                            id,
                            site,
                        });
                    }
                }
            } else {
                let stale = block.state == BlockState::Stale;
                updates.extend(block.definitions.iter().map(|d| {
                    let mut d = d.clone();
                    d.site.stale = stale;
                    d
                }));
            }
        }
        updates.sort_by_key(|d| (d.priority, d.site.position()));

        let mut registry = LabelRegistry::new();
        for d in updates {
            registry.register(&d.id, d.site);
        }
        registry
    }

    /// Runs the structural processors over a block. Returns the lines that
    /// want inline processing and where it starts.
    fn structural(&mut self, bi: usize) -> Vec<(usize, usize)> {
        let lines = self.blocks[bi].lines.clone();
        let mut decorations = Vec::new();
        let mut definitions = Vec::new();
        let mut diagnostics = Vec::new();
        let mut inline = Vec::new();

        for line in lines {
            let last_known = self
                .edit
                .old_line(line)
                .and_then(|o| self.old.analysis.record_at_line(o))
                .map(|r| r.label.display.as_str());
            let ctx = LineContext {
                line,
                scan: &self.analysis.lines[line],
                role: self.analysis.roles[line],
                record: self.analysis.record_at_line(line),
                last_known,
                cursor: self.cursor,
                config: self.config,
            };
            let run = self.processors.run_structural(&ctx);
            let priority = run.claimed_by.map_or(u32::MAX, |(_, p)| p);
            decorations.extend(run.output.decorations);
            definitions.extend(
                run.output
                    .definitions
                    .into_iter()
                    .map(|(id, site)| BlockDefinition { id, site, priority }),
            );
            diagnostics.extend(run.diagnostics);
            if let Some(from) = run.output.inline_from {
                inline.push((line, from));
            }
        }

        let block = &mut self.blocks[bi];
        block.state = BlockState::Scanning;
        block.decorations = decorations;
        block.definitions = definitions;
        block.diagnostics = diagnostics;
        block.references.clear();
        inline
    }

    fn inline(&mut self, bi: usize, lines: &[(usize, usize)], registry: &LabelRegistry) {
        let options = InlineOptions::from(&self.config.settings().inline);
        let mut decorations = Vec::new();
        let mut references = BTreeSet::new();
        let mut diagnostics = Vec::new();

        for &(line, from) in lines {
            let scan = &self.analysis.lines[line];
            let content = scan.line.content;
            let Some(text) = scan.line.text.get(from.saturating_sub(content.start)..) else {
                continue;
            };
            if text.is_empty() {
                continue;
            }
            let nodes = parse_inline(from, text, options);
            let ctx = InlineContext {
                registry,
                text,
                base: from,
                cursor: self.cursor,
                config: self.config,
            };
            let out = self.processors.run_inline(&ctx, &nodes);
            decorations.extend(out.decorations);
            diagnostics.extend(out.diagnostics);
            references.extend(out.references.iter().flat_map(|r| r.target.candidates()));
        }

        let block = &mut self.blocks[bi];
        block.decorations.extend(decorations);
        block.diagnostics.extend(diagnostics);
        block.references = references;
        block.state = BlockState::Decorated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        editing::Cmd,
        live::decoration::{DecorationKind, Widget},
        parsing::analysis::analyze_text,
    };
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> Document {
        Document::from_bytes(text.as_bytes()).unwrap()
    }

    fn widgets(pipeline: &LivePipeline) -> Vec<String> {
        pipeline
            .decorations()
            .iter()
            .filter_map(|d| match &d.kind {
                DecorationKind::Replace(w) => Some(w.text().to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_pass_decorates_every_block() {
        let d = doc("1. a\n1. b\n\ntext\n\n- c\n");
        let mut p = LivePipeline::default();
        let diff = p.process(&d).unwrap();
        assert_eq!(diff.updated.len(), 2);
        assert_eq!(widgets(&p), vec!["1.", "2.", "•"]);
        assert!(p.blocks().iter().all(|b| b.state == BlockState::Decorated));
    }

    #[test]
    fn pass_for_an_old_revision_is_rejected() {
        let mut d = doc("1. a\n");
        let mut p = LivePipeline::default();
        let pass = p.begin_pass(&d);
        d.apply(Cmd::InsertText {
            at: 4,
            text: "b".into(),
        });
        assert_eq!(
            p.commit(pass, &d),
            Err(PipelineError::StaleRevision {
                pass: 0,
                current: 1
            })
        );
        assert!(p.revision().is_none());
    }

    #[test]
    fn rescan_stops_once_state_converges() {
        let text: String = (0..50).map(|i| format!("line {i}\n")).collect();
        let mut d = doc(&text);
        let mut p = LivePipeline::default();
        p.process(&d).unwrap();
        d.apply(Cmd::InsertText {
            at: 0,
            text: "x".into(),
        });
        let pass = p.begin_pass(&d);
        assert_eq!(pass.stats().rescanned_lines, 1);
        assert_eq!(pass.diff().shift, Some((7, 1)));
    }

    #[test]
    fn deleting_an_item_renumbers_the_rest() {
        let mut d = doc("1. a\n2. b\n3. c\n");
        let mut p = LivePipeline::default();
        p.process(&d).unwrap();
        d.apply(Cmd::DeleteRange { range: 5..10 });
        p.process(&d).unwrap();
        assert_eq!(d.text(), "1. a\n3. c\n");
        assert_eq!(widgets(&p), vec!["1.", "2."]);
    }

    #[test]
    fn untouched_blocks_are_not_reemitted() {
        let mut d = doc("- a\n\nplain\n\n- b\n");
        let mut p = LivePipeline::default();
        p.process(&d).unwrap();
        d.apply(Cmd::InsertText {
            at: 5,
            text: "more ".into(),
        });
        let diff = p.process(&d).unwrap();
        assert!(diff.updated.is_empty());
        assert_eq!(diff.removed.len(), 0);
        assert_eq!(diff.shift, Some((11, 5)));
    }

    #[test]
    fn renaming_a_label_breaks_its_reference_in_the_same_pass() {
        let mut d = doc("(foo) First\n\nSee \\ref{foo}.\n");
        let mut p = LivePipeline::default();
        p.process(&d).unwrap();
        assert!(widgets(&p).contains(&"(foo)".to_string()));
        d.apply(Cmd::ReplaceRange {
            range: 1..4,
            text: "bar".into(),
        });
        p.process(&d).unwrap();
        let all = p.decorations();
        assert!(all.iter().any(|dec| matches!(
            &dec.kind,
            DecorationKind::Replace(Widget::BrokenReference { raw }) if raw == "\\ref{foo}"
        )));
        assert_eq!(p.diagnostics().len(), 1);
    }

    #[test]
    fn forward_reference_resolves() {
        let d = doc("See \\ref{foo}.\n\n(foo) Later\n");
        let mut p = LivePipeline::default();
        p.process(&d).unwrap();
        assert_eq!(widgets(&p), vec!["(foo)", "(foo)"]);
        assert!(p.diagnostics().is_empty());
    }

    #[test]
    fn duplicate_labels_are_marked_once_each() {
        let d = doc("(dup) one\n\n(dup) two\n\n(dup) three\n");
        let mut p = LivePipeline::default();
        p.process(&d).unwrap();
        let marks = p
            .decorations()
            .into_iter()
            .filter(|dec| dec.kind == DecorationKind::Mark(MarkKind::DuplicateLabel))
            .count();
        assert_eq!(marks, 2);
    }

    #[test]
    fn settings_change_rescans_everything() {
        let d = doc("#. a\n#. b\n");
        let mut p = LivePipeline::default();
        p.process(&d).unwrap();
        let mut settings = Settings::default();
        settings.numbering.hash = "[{n}]".into();
        p.set_settings(&settings).unwrap();
        let diff = p.process(&d).unwrap();
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(widgets(&p), vec!["[1]", "[2]"]);
    }

    #[test]
    fn live_labels_match_a_fresh_analysis_after_edits() {
        let mut d = doc("a. one\nb. two\n\n(@) ex\n\nc. three\n");
        let mut p = LivePipeline::default();
        p.process(&d).unwrap();
        for cmd in [
            Cmd::InsertText {
                at: 0,
                text: "z. zero\n".into(),
            },
            Cmd::DeleteRange { range: 8..15 },
            Cmd::InsertText {
                at: 8,
                text: "(@) new\n".into(),
            },
        ] {
            d.apply(cmd);
            p.process(&d).unwrap();
            let fresh = analyze_text(&d.text(), p.config());
            assert_eq!(p.analysis().unwrap().labels(), fresh.labels());
        }
    }
}
