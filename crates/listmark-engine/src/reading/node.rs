use crate::parsing::{
    rope::span::Span,
    types::{ListId, MarkerKind, NumberStyle},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    List {
        kind: MarkerKind,
        style: NumberStyle,
        list_id: ListId,
    },
    /// `record` indexes the analysis records.
    Item { record: usize },
    DefinitionList,
    Term,
    Definition,
    Paragraph,
    /// Prose lines rendered inline; leading indentation is dropped per line.
    Text,
    /// Source handed to pulldown-cmark as whole blocks.
    Markdown,
}

/// One node of the reading-mode tree. Built fresh for every render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNode {
    pub kind: NodeKind,
    pub children: Vec<ParsedNode>,
    pub source: Span,
    /// Displayed label for items.
    pub rendered_number: Option<String>,
}

impl ParsedNode {
    pub fn new(kind: NodeKind, source: Span) -> Self {
        Self {
            kind,
            children: Vec::new(),
            source,
            rendered_number: None,
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<ParsedNode>) -> Self {
        let source = match (children.first(), children.last()) {
            (Some(first), Some(last)) => Span::new(first.source.start, last.source.end),
            _ => Span::default(),
        };
        Self {
            kind,
            children,
            source,
            rendered_number: None,
        }
    }

    /// Pre-order traversal.
    pub fn descendants(&self) -> Vec<&ParsedNode> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.descendants());
        }
        out
    }

    /// Item labels in document order.
    pub fn numbers(&self) -> Vec<String> {
        self.descendants()
            .into_iter()
            .filter_map(|n| n.rendered_number.clone())
            .collect()
    }
}
