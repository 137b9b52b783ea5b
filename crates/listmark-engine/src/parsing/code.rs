//! Code-block detection.
//!
//! Fenced code blocks are raw zones: no scanner may see a marker inside one.
//! The host markdown grammar (tree-sitter-md) decides where they are, for the
//! live document (incremental tree) and for reading mode (fresh parse) alike.

use tree_sitter::{Node, Parser, Tree};
use tree_sitter_md::LANGUAGE;

use crate::parsing::rope::{lines::LineRef, span::Span};

const FENCED_CODE_BLOCK: &str = "fenced_code_block";

/// Byte ranges of the fenced code blocks of one document, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeRegions {
    regions: Vec<Span>,
}

impl CodeRegions {
    /// Collects fenced code blocks from an existing tree.
    pub fn from_tree(tree: &Tree) -> Self {
        let mut regions = Vec::new();
        collect_fences(tree.root_node(), &mut regions);
        regions.sort();
        Self { regions }
    }

    /// Parses `text` from scratch. A grammar failure yields no regions, so
    /// the worst case is scanning code as prose.
    pub fn parse(text: &str) -> Self {
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&LANGUAGE.into()) {
            log::warn!("markdown grammar unavailable, code blocks will not be detected: {e}");
            return Self::default();
        }
        match parser.parse(text, None) {
            Some(tree) => Self::from_tree(&tree),
            None => {
                log::warn!("markdown parse produced no tree, code blocks will not be detected");
                Self::default()
            }
        }
    }

    pub fn from_spans(mut regions: Vec<Span>) -> Self {
        regions.sort();
        Self { regions }
    }

    pub fn spans(&self) -> &[Span] {
        &self.regions
    }

    /// Whether any part of the line lies in a code block (fence lines
    /// included). A fence nested in a list item starts after the line's
    /// indentation, so the whole line is tested, not its first byte.
    pub fn contains_line(&self, line: &LineRef) -> bool {
        let content = line.content;
        let idx = self.regions.partition_point(|r| r.end <= content.start);
        // Empty lines count by their position.
        let end = content.end.max(content.start + 1);
        self.regions
            .get(idx)
            .is_some_and(|r| r.start < end && content.start < r.end)
    }

    /// One flag per line.
    pub fn line_flags(&self, lines: &[LineRef]) -> Vec<bool> {
        lines.iter().map(|l| self.contains_line(l)).collect()
    }
}

fn collect_fences(node: Node<'_>, out: &mut Vec<Span>) {
    if node.kind() == FENCED_CODE_BLOCK {
        out.push(Span::new(node.start_byte(), node.end_byte()));
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_fences(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::rope::split_lines;

    #[test]
    fn fenced_block_lines_are_code() {
        let text = "(foo) before\n\n```\n(foo) inside\n```\n\n(bar) after\n";
        let lines = split_lines(text);
        let flags = CodeRegions::parse(text).line_flags(&lines);
        assert_eq!(flags, vec![false, false, true, true, true, false, false]);
    }

    #[test]
    fn tilde_fences_count_too() {
        let text = "~~~\n1. not a list\n~~~\n";
        let lines = split_lines(text);
        let flags = CodeRegions::parse(text).line_flags(&lines);
        assert!(flags[1]);
    }

    #[test]
    fn plain_text_has_no_regions() {
        assert!(CodeRegions::parse("1. one\n2. two\n").spans().is_empty());
    }

    #[test]
    fn fence_inside_a_list_item_is_code_from_its_opening_line() {
        let text = "1. a\n\n   ```\n   (foo) code\n   ```\n\n2. b\n";
        let lines = split_lines(text);
        let flags = CodeRegions::parse(text).line_flags(&lines);
        assert_eq!(flags, vec![false, false, true, true, true, false, false]);
    }

    #[test]
    fn region_starting_mid_line_flags_that_line() {
        let regions = CodeRegions::from_spans(vec![Span::new(13, 30)]);
        let lines = split_lines("aaaaaaaaa\n   ```x\n");
        assert_eq!(regions.line_flags(&lines), vec![false, true]);
    }

    #[test]
    fn explicit_spans_are_looked_up_by_line_range() {
        let regions = CodeRegions::from_spans(vec![Span::new(10, 20)]);
        let lines = split_lines("aaaaaaaaa\nbbbbbbbbb\ncc\n");
        assert_eq!(regions.line_flags(&lines), vec![false, true, false]);
    }
}
