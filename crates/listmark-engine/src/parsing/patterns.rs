//! Shared patterns for list markers, labels and block openers.
//!
//! Every scanner and extractor takes its syntax knowledge from here, so the
//! live pipeline and the reading renderer cannot drift apart on what a marker
//! looks like.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::settings::CustomLabelPattern;

/// Characters allowed in a custom label, plus `(#name)` placeholders.
pub const CUSTOM_LABEL_BODY: &str = r"(?:[A-Za-z0-9_'\-]|\(#[A-Za-z0-9_]+\))+";

/// Characters allowed in an example label.
pub const EXAMPLE_LABEL_BODY: &str = r"[A-Za-z0-9_\-]*";

/// Maximum digits in a decimal marker before the number counts as malformed.
pub const MAX_DECIMAL_DIGITS: usize = 9;

/// Maximum letters in an alphabetic marker (`zz` is item 702).
pub const MAX_ALPHA_LETTERS: usize = 2;

/// Columns a tab advances to.
pub const TAB_STOP: usize = 4;

pub static EXAMPLE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?P<indent>[ \t]*)(?P<marker>\(@(?P<label>{EXAMPLE_LABEL_BODY})\))(?P<ws>[ \t]+|$)"
    ))
    .expect("example marker pattern")
});

pub static HASH_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)(?P<marker>#(?P<delim>[.)]))(?P<ws>[ \t]+|$)")
        .expect("hash marker pattern")
});

pub static FANCY_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<indent>[ \t]*)(?P<marker>\((?P<paren>[A-Za-z]+)\)|(?P<bare>[A-Za-z]+)(?P<delim>[.)]))(?P<ws>[ \t]+|$)",
    )
    .expect("fancy marker pattern")
});

pub static DECIMAL_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<indent>[ \t]*)(?P<marker>\((?P<paren>[0-9]+)\)|(?P<bare>[0-9]+)(?P<delim>[.)]))(?P<ws>[ \t]+|$)",
    )
    .expect("decimal marker pattern")
});

pub static BULLET_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)(?P<marker>[-*+])(?P<ws>[ \t]+|$)").expect("bullet pattern")
});

pub static DEFINITION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<indent> {0,3})(?P<marker>[:~])(?P<ws>[ \t]+)").expect("definition pattern")
});

pub static ATX_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}#{1,6}(?:[ \t]|$)").expect("heading pattern"));

pub static THEMATIC_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}(?:(?:\*[ \t]*){3,}|(?:-[ \t]*){3,}|(?:_[ \t]*){3,})$")
        .expect("thematic break pattern")
});

/// `(#name)` placeholders inside a custom label.
pub static LABEL_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(#(?P<name>[A-Za-z0-9_]+)\)").expect("placeholder pattern"));

pub static EXAMPLE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{EXAMPLE_LABEL_BODY}$")).expect("example label pattern")
});

pub static CUSTOM_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{CUSTOM_LABEL_BODY}$")).expect("custom label pattern")
});

pub static DEFAULT_CUSTOM_LABEL: Lazy<CustomLabelPattern> =
    Lazy::new(|| CustomLabelPattern::compile("({label})").expect("default custom label template"));

/// Leading indentation of `text` as (columns, bytes).
pub fn leading_indent(text: &str) -> (usize, usize) {
    let mut cols = 0usize;
    let mut bytes = 0usize;
    for b in text.bytes() {
        match b {
            b' ' => cols += 1,
            b'\t' => cols += TAB_STOP - (cols % TAB_STOP),
            _ => break,
        }
        bytes += 1;
    }
    (cols, bytes)
}

pub fn is_heading(text: &str) -> bool {
    ATX_HEADING.is_match(text)
}

pub fn is_thematic_break(text: &str) -> bool {
    THEMATIC_BREAK.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", (0, 0))]
    #[case("  x", (2, 2))]
    #[case("\tx", (4, 1))]
    #[case("  \tx", (4, 3))]
    fn indent_counts_columns(#[case] text: &str, #[case] expected: (usize, usize)) {
        assert_eq!(leading_indent(text), expected);
    }

    #[rstest]
    #[case("(@) first", Some(""))]
    #[case("(@good) first", Some("good"))]
    #[case("  (@a-b_1)", Some("a-b_1"))]
    #[case("(@bad label) x", None)]
    #[case("(@good)x", None)]
    fn example_marker_shapes(#[case] line: &str, #[case] label: Option<&str>) {
        let got = EXAMPLE_MARKER
            .captures(line)
            .map(|c| c.name("label").map_or("", |m| m.as_str()).to_string());
        assert_eq!(got.as_deref(), label);
    }

    #[rstest]
    #[case("# Heading", true)]
    #[case("#. hash item", false)]
    #[case("####### too deep", false)]
    fn headings(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(is_heading(line), expected);
    }

    #[rstest]
    #[case("---", true)]
    #[case("- - -", true)]
    #[case("- item", false)]
    #[case("***", true)]
    fn thematic_breaks(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(is_thematic_break(line), expected);
    }

    #[test]
    fn custom_label_body_accepts_placeholders() {
        assert!(CUSTOM_LABEL.is_match("P(#a)"));
        assert!(CUSTOM_LABEL.is_match("Claim-1"));
        assert!(!CUSTOM_LABEL.is_match("two words"));
    }
}
