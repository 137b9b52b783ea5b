use crate::parsing::rope::span::Span;

/// A parsed inline node. Spans are absolute byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineNode {
    Text(Span),
    /// Backtick span; `inner` excludes the backtick runs.
    CodeSpan { full: Span, inner: Span },
    /// `\ref{label}`; `label` covers the text between the braces.
    LabelRef { full: Span, label: Span },
    /// `(@label)`; `label` excludes the `@`.
    ExampleRef { full: Span, label: Span },
    Superscript { full: Span, inner: Span },
    Subscript { full: Span, inner: Span },
}

impl InlineNode {
    pub fn span(&self) -> Span {
        match self {
            InlineNode::Text(sp) => *sp,
            InlineNode::CodeSpan { full, .. }
            | InlineNode::LabelRef { full, .. }
            | InlineNode::ExampleRef { full, .. }
            | InlineNode::Superscript { full, .. }
            | InlineNode::Subscript { full, .. } => *full,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, InlineNode::Text(_))
    }
}
