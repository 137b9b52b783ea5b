//! What the live pipeline hands to the editor.

use crate::parsing::{
    rope::span::Span,
    types::{MarkerKind, NumberStyle},
};

/// Replacement content drawn in place of source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Widget {
    ListMarker {
        display: String,
        kind: MarkerKind,
        style: NumberStyle,
    },
    ExampleNumber {
        display: String,
        label: Option<String>,
    },
    CustomLabel {
        display: String,
        id: String,
    },
    DefinitionBullet,
    Reference {
        display: String,
        target: String,
        stale: bool,
    },
    BrokenReference {
        raw: String,
    },
}

impl Widget {
    /// Content key: two widgets with equal keys render identically, so a host
    /// may keep the existing one instead of rebuilding it.
    pub fn key(&self) -> String {
        match self {
            Widget::ListMarker { display, kind, .. } => format!("marker:{}:{display}", kind.as_str()),
            Widget::ExampleNumber { display, .. } => format!("example:{display}"),
            Widget::CustomLabel { display, .. } => format!("label:{display}"),
            Widget::DefinitionBullet => "definition".to_string(),
            Widget::Reference {
                display, stale, ..
            } => format!("ref:{display}:{stale}"),
            Widget::BrokenReference { raw } => format!("broken:{raw}"),
        }
    }

    /// Text a plain-text host shows for the widget.
    pub fn text(&self) -> &str {
        match self {
            Widget::ListMarker { display, .. }
            | Widget::ExampleNumber { display, .. }
            | Widget::CustomLabel { display, .. }
            | Widget::Reference { display, .. } => display,
            Widget::DefinitionBullet => "•",
            Widget::BrokenReference { raw } => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkKind {
    /// The cursor is inside this marker; its source is shown as typed.
    RevealedMarker,
    DefinitionTerm,
    Superscript,
    Subscript,
    DuplicateLabel,
    /// Best-effort numbering that could not be recomputed.
    StaleNumber,
    /// A processor failed on this range.
    ProcessorFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineClass {
    ListItem { depth: usize },
    Continuation { depth: usize },
    DefinitionTerm,
    Definition,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    Replace(Widget),
    Mark(MarkKind),
    Hide,
    Line(LineClass),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decoration {
    pub span: Span,
    pub kind: DecorationKind,
}

impl Decoration {
    pub fn replace(span: Span, widget: Widget) -> Self {
        Self {
            span,
            kind: DecorationKind::Replace(widget),
        }
    }

    pub fn mark(span: Span, mark: MarkKind) -> Self {
        Self {
            span,
            kind: DecorationKind::Mark(mark),
        }
    }

    pub fn hide(span: Span) -> Self {
        Self {
            span,
            kind: DecorationKind::Hide,
        }
    }

    pub fn line(span: Span, class: LineClass) -> Self {
        Self {
            span,
            kind: DecorationKind::Line(class),
        }
    }

    pub fn shifted(&self, delta: isize) -> Decoration {
        Decoration {
            span: self.span.shifted(delta),
            kind: self.kind.clone(),
        }
    }
}

/// Decorations of one block after a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockUpdate {
    pub span: Span,
    pub decorations: Vec<Decoration>,
}

/// What changed since the previous commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationDiff {
    pub revision: u64,
    /// Existing decorations at or after `.0` (old coordinates) move by `.1`.
    pub shift: Option<(usize, isize)>,
    /// Old-coordinate spans of decorated blocks that no longer exist.
    pub removed: Vec<Span>,
    /// Blocks with new decorations, new coordinates.
    pub updated: Vec<BlockUpdate>,
}

impl DecorationDiff {
    pub fn is_empty(&self) -> bool {
        self.shift.is_none() && self.removed.is_empty() && self.updated.is_empty()
    }
}
