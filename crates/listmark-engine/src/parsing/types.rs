use serde::{Deserialize, Serialize};

use crate::parsing::rope::span::Span;

/// The family of list syntax a marker belongs to.
///
/// The declaration order is also the scanner precedence: a line is offered to
/// the custom-label scanner before the more generic standard scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    CustomLabel,
    Example,
    Hash,
    Fancy,
    Standard,
    Definition,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 6] = [
        MarkerKind::CustomLabel,
        MarkerKind::Example,
        MarkerKind::Hash,
        MarkerKind::Fancy,
        MarkerKind::Standard,
        MarkerKind::Definition,
    ];

    /// Short name used in CSS classes and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerKind::CustomLabel => "custom-label",
            MarkerKind::Example => "example",
            MarkerKind::Hash => "hash",
            MarkerKind::Fancy => "fancy",
            MarkerKind::Standard => "standard",
            MarkerKind::Definition => "definition",
        }
    }
}

/// How an item's number or label is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberStyle {
    Bullet,
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
    Hash,
    Example,
    Label,
    Definition,
}

impl NumberStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            NumberStyle::Bullet => "bullet",
            NumberStyle::Decimal => "decimal",
            NumberStyle::LowerAlpha => "lower-alpha",
            NumberStyle::UpperAlpha => "upper-alpha",
            NumberStyle::LowerRoman => "lower-roman",
            NumberStyle::UpperRoman => "upper-roman",
            NumberStyle::Hash => "hash",
            NumberStyle::Example => "example",
            NumberStyle::Label => "label",
            NumberStyle::Definition => "definition",
        }
    }

    /// Styles that carry a counter.
    pub fn is_counted(self) -> bool {
        matches!(
            self,
            NumberStyle::Decimal
                | NumberStyle::LowerAlpha
                | NumberStyle::UpperAlpha
                | NumberStyle::LowerRoman
                | NumberStyle::UpperRoman
                | NumberStyle::Hash
        )
    }
}

/// Punctuation around an ordered marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// `1.`
    Period,
    /// `1)`
    RightParen,
    /// `(1)`
    Parens,
    /// Bullets, definitions and labels.
    None,
}

impl Delimiter {
    /// Wraps an already formatted number in this delimiter.
    pub fn wrap(self, number: &str) -> String {
        match self {
            Delimiter::Period => format!("{number}."),
            Delimiter::RightParen => format!("{number})"),
            Delimiter::Parens => format!("({number})"),
            Delimiter::None => number.to_string(),
        }
    }
}

/// Two markers of the same family may belong to one list; anything else
/// starts a new list at that depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListFamily {
    pub kind: MarkerKind,
    pub style: NumberStyle,
    pub delimiter: Delimiter,
    pub bullet: Option<char>,
}

/// A list marker recognised on one line.
///
/// Produced by the scanners and never mutated afterwards, except for the
/// position shift applied when an edit happens above the line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerToken {
    pub kind: MarkerKind,
    pub style: NumberStyle,
    pub delimiter: Delimiter,
    /// The marker exactly as written, e.g. `(a)`, `#.`, `(@good)`.
    pub raw: String,
    /// Leading indentation in columns (tabs count as 4).
    pub indent: usize,
    /// Absolute byte offset of the first marker byte.
    pub start: usize,
    /// Absolute byte offset just past the marker.
    pub end: usize,
    /// Absolute byte offset where the item text begins.
    pub content_start: usize,
    /// Example or custom label text, as written.
    pub label: Option<String>,
    /// Parsed number of an ordered marker (`c.` is 3, `iv)` is 4).
    pub literal: Option<u32>,
    /// The marker looks ordered but its number could not be read.
    pub malformed_literal: bool,
    /// Same family as the previous marker at this indent.
    pub is_continuation: bool,
    /// Bullet character for unordered markers.
    pub bullet: Option<char>,
}

impl MarkerToken {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn family(&self) -> ListFamily {
        ListFamily {
            kind: self.kind,
            style: self.style,
            delimiter: self.delimiter,
            bullet: self.bullet,
        }
    }

    /// Copy of the token moved by `delta` bytes.
    pub fn shifted(&self, delta: isize) -> MarkerToken {
        MarkerToken {
            start: self.start.saturating_add_signed(delta),
            end: self.end.saturating_add_signed(delta),
            content_start: self.content_start.saturating_add_signed(delta),
            ..self.clone()
        }
    }
}

/// Identifier of one list (a run of sibling items) within an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListId(pub u32);

/// The computed number or label of one item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemLabel {
    /// Counter value (example number, decimal value, alphabet position).
    /// Zero for bullets and custom labels.
    pub ordinal: u32,
    /// The number in its style without delimiters: `3`, `c`, `iv`, `Claim1`.
    pub text: String,
    /// What a reader sees in place of the marker: `3.`, `(c)`, `(1)`.
    pub display: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberingStatus {
    Ok,
    /// Nesting exceeded the depth limit; the label is a best effort.
    Clamped,
}

/// One list item after a renumbering pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListItemRecord {
    /// Line index of the item's marker.
    pub line: usize,
    pub token: MarkerToken,
    pub label: ItemLabel,
    /// The list this item belongs to.
    pub list_id: ListId,
    pub depth: usize,
    pub sibling_index: usize,
    /// First item of a new list (as opposed to continuing one).
    pub started_new: bool,
    pub status: NumberingStatus,
}

impl ListItemRecord {
    /// The part of a record that decides how the item looks. Two records with
    /// equal keys decorate identically, whatever their byte positions.
    pub fn visual_key(&self) -> (MarkerKind, &str, usize, bool, NumberingStatus) {
        (
            self.token.kind,
            self.label.display.as_str(),
            self.depth,
            self.started_new,
            self.status,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiters_wrap_numbers() {
        assert_eq!(Delimiter::Period.wrap("3"), "3.");
        assert_eq!(Delimiter::RightParen.wrap("c"), "c)");
        assert_eq!(Delimiter::Parens.wrap("iv"), "(iv)");
        assert_eq!(Delimiter::None.wrap("x"), "x");
    }

    #[test]
    fn kind_order_is_scanner_precedence() {
        let mut kinds = MarkerKind::ALL.to_vec();
        kinds.sort();
        assert_eq!(kinds.first(), Some(&MarkerKind::CustomLabel));
        assert_eq!(kinds.last(), Some(&MarkerKind::Definition));
    }
}
