//! Builds the reading-mode tree from a whole-document analysis.
//!
//! Phase one of reading mode: the source goes through the same scanners and
//! numbering as the live pipeline, every label definition is registered, and
//! lines are grouped into lists, definition lists, paragraphs and
//! passthrough markdown.

use crate::{
    labels::LabelRegistry,
    parsing::{
        analysis::{Analysis, LineRole, analyze_text},
        extract::DefinitionGroup,
        rope::span::Span,
    },
    settings::ProcessingConfig,
};

use super::node::{NodeKind, ParsedNode};

#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub root: ParsedNode,
    pub analysis: Analysis,
    pub registry: LabelRegistry,
}

pub fn parse_document(source: &str, config: &ProcessingConfig) -> ParsedDocument {
    let analysis = analyze_text(source, config);
    let registry = LabelRegistry::from_records(&analysis.records);
    let root = TreeBuilder::new(&analysis).build();
    ParsedDocument {
        root,
        analysis,
        registry,
    }
}

struct TreeBuilder<'a> {
    analysis: &'a Analysis,
    /// Continuation lines of each record.
    continuations: Vec<Vec<usize>>,
}

impl<'a> TreeBuilder<'a> {
    fn new(analysis: &'a Analysis) -> Self {
        let mut continuations = vec![Vec::new(); analysis.records.len()];
        for (line, role) in analysis.roles.iter().enumerate() {
            if let LineRole::Continuation { record, .. } = role
                && let Some(lines) = continuations.get_mut(*record)
            {
                lines.push(line);
            }
        }
        Self {
            analysis,
            continuations,
        }
    }

    fn content(&self, line: usize) -> Span {
        self.analysis.lines[line].line.content
    }

    fn role(&self, line: usize) -> LineRole {
        self.analysis.roles[line]
    }

    fn build(&self) -> ParsedNode {
        let n = self.analysis.lines.len();
        let mut children = Vec::new();
        let mut i = 0;
        while i < n {
            match self.role(i) {
                LineRole::Blank => i += 1,
                LineRole::Item { .. } | LineRole::Continuation { .. } => {
                    let (nodes, next) = self.list_segment(i);
                    children.extend(nodes);
                    i = next;
                }
                LineRole::DefinitionTerm { group } => {
                    let group = &self.analysis.definitions[group];
                    children.push(self.definition_list(group));
                    i = group.last_line() + 1;
                }
                LineRole::Code => {
                    let end = self.run_end(i, |r| r == LineRole::Code);
                    children.push(self.markdown(i, end));
                    i = end;
                }
                LineRole::Break => {
                    children.push(self.markdown(i, i + 1));
                    i += 1;
                }
                LineRole::Text
                | LineRole::DefinitionMarker { .. }
                | LineRole::DefinitionContinuation { .. } => {
                    let end = self.run_end(i, |r| r == LineRole::Text);
                    children.push(self.paragraph(i, end.max(i + 1)));
                    i = end.max(i + 1);
                }
            }
        }
        let mut root = ParsedNode::with_children(NodeKind::Document, children);
        root.source = Span::new(0, self.analysis.lines.last().map_or(0, |l| l.line.span.end));
        root
    }

    /// First line at or after `start` whose role fails `keep`.
    fn run_end(&self, start: usize, keep: impl Fn(LineRole) -> bool) -> usize {
        (start..self.analysis.lines.len())
            .find(|&i| !keep(self.role(i)))
            .unwrap_or(self.analysis.lines.len())
    }

    fn span_of(&self, start: usize, end: usize) -> Span {
        Span::new(self.content(start).start, self.content(end - 1).end)
    }

    fn markdown(&self, start: usize, end: usize) -> ParsedNode {
        ParsedNode::new(NodeKind::Markdown, self.span_of(start, end))
    }

    /// Plain paragraphs become `Paragraph`; quotes, tables, html and
    /// indented code pass through whole.
    fn paragraph(&self, start: usize, end: usize) -> ParsedNode {
        let first = &self.analysis.lines[start];
        let trimmed = first.text().trim_start();
        let passthrough = first.indent >= 4
            || trimmed.starts_with('>')
            || trimmed.starts_with('|')
            || trimmed.starts_with('<');
        if passthrough {
            return self.markdown(start, end);
        }
        let text = ParsedNode::new(NodeKind::Text, self.span_of(start, end));
        ParsedNode::with_children(NodeKind::Paragraph, vec![text])
    }

    /// Items, their continuations and the blank lines between them.
    fn list_segment(&self, start: usize) -> (Vec<ParsedNode>, usize) {
        let n = self.analysis.lines.len();
        let mut end = start;
        let mut j = start;
        while j < n {
            match self.role(j) {
                LineRole::Item { .. } | LineRole::Continuation { .. } => {
                    j += 1;
                    end = j;
                }
                LineRole::Blank => j += 1,
                _ => break,
            }
        }

        let records = &self.analysis.records;
        let first = records.partition_point(|r| r.line < start);
        let last = records.partition_point(|r| r.line < end);

        // Continuation lines of an item already rendered elsewhere.
        let orphans = (start..end)
            .find(|&l| !matches!(self.role(l), LineRole::Continuation { record, .. } if record < first))
            .unwrap_or(end);
        let mut out = Vec::new();
        if orphans > start {
            let text = ParsedNode::new(NodeKind::Text, self.span_of(start, orphans));
            out.push(ParsedNode::with_children(NodeKind::Paragraph, vec![text]));
        }
        out.extend(self.lists(first, last));
        (out, end)
    }

    /// Lists made of records `[first, last)`; deeper records nest inside the
    /// item before them.
    fn lists(&self, first: usize, last: usize) -> Vec<ParsedNode> {
        let records = &self.analysis.records;
        let mut out = Vec::new();
        let mut k = first;
        while k < last {
            let head = &records[k];
            let mut items = Vec::new();
            while k < last && records[k].depth == head.depth && records[k].list_id == head.list_id {
                let item = k;
                k += 1;
                let nested_start = k;
                while k < last && records[k].depth > head.depth {
                    k += 1;
                }
                let nested = self.lists(nested_start, k);
                items.push(self.item(item, nested));
            }
            out.push(ParsedNode::with_children(
                NodeKind::List {
                    kind: head.token.kind,
                    style: head.token.style,
                    list_id: head.list_id,
                },
                items,
            ));
        }
        out
    }

    fn item(&self, r: usize, nested: Vec<ParsedNode>) -> ParsedNode {
        let record = &self.analysis.records[r];
        let first = Span::new(
            record.token.content_start.min(self.content(record.line).end),
            self.content(record.line).end,
        );
        let mut children = self.runs(first, record.line, &self.continuations[r]);
        children.extend(nested);
        children.sort_by_key(|c| c.source.start);

        let mut node = ParsedNode::with_children(NodeKind::Item { record: r }, children);
        node.source = Span::new(record.token.start, node.source.end.max(record.token.end));
        node.rendered_number = Some(record.label.display.clone());
        node
    }

    /// Groups a first line (already trimmed to its text) and its
    /// continuation lines into text and code runs. A blank line or a change
    /// between code and text starts a new run.
    fn runs(&self, first: Span, first_line: usize, rest: &[usize]) -> Vec<ParsedNode> {
        let mut out: Vec<ParsedNode> = Vec::new();
        let mut current: Option<(NodeKind, Span, usize)> = None;
        if !first.is_empty() {
            current = Some((NodeKind::Text, first, first_line));
        }
        for &line in rest {
            let scan = &self.analysis.lines[line];
            let kind = if scan.in_code {
                NodeKind::Markdown
            } else {
                NodeKind::Text
            };
            let span = self.content(line);
            current = match current.take() {
                Some((k, sp, last)) if k == kind && last + 1 == line => {
                    Some((k, Span::new(sp.start, span.end), line))
                }
                Some((k, sp, _)) => {
                    out.push(ParsedNode::new(k, sp));
                    Some((kind, span, line))
                }
                None => Some((kind, span, line)),
            };
        }
        out.extend(current.map(|(k, sp, _)| ParsedNode::new(k, sp)));
        out
    }

    fn definition_list(&self, group: &DefinitionGroup) -> ParsedNode {
        let mut children = Vec::new();
        for entry in &group.entries {
            let term = self.content(entry.term);
            children.push(ParsedNode::with_children(
                NodeKind::Term,
                vec![ParsedNode::new(NodeKind::Text, term)],
            ));
            for def in &entry.definitions {
                let content = self.content(def.marker_line);
                let start = self.analysis.lines[def.marker_line]
                    .marker
                    .as_ref()
                    .map_or(content.start, |t| t.content_start.min(content.end));
                let runs = self.runs(
                    Span::new(start, content.end),
                    def.marker_line,
                    &def.continuation,
                );
                let mut node = ParsedNode::with_children(NodeKind::Definition, runs);
                node.source = Span::new(content.start, node.source.end.max(content.end));
                children.push(node);
            }
        }
        ParsedNode::with_children(NodeKind::DefinitionList, children)
    }
}
