//! Definition-list blocks.
//!
//! A definition marker (`: ` or `~ `) only counts when a term precedes it:
//! a plain line at most one blank line above, or the previous definition of
//! the same block. Lines after a definition continue it when they follow
//! directly (lazy) or are indented by at least [`DEFINITION_INDENT`] columns.

use crate::parsing::{scan::LineScan, types::MarkerKind};

/// Indentation that keeps a line inside a definition after a blank line.
pub const DEFINITION_INDENT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionItem {
    pub marker_line: usize,
    pub continuation: Vec<usize>,
}

impl DefinitionItem {
    pub fn last_line(&self) -> usize {
        self.continuation.last().copied().unwrap_or(self.marker_line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionEntry {
    pub term: usize,
    pub definitions: Vec<DefinitionItem>,
}

/// One `<dl>`: consecutive entries separated by at most one blank line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionGroup {
    pub entries: Vec<DefinitionEntry>,
}

impl DefinitionGroup {
    pub fn first_line(&self) -> usize {
        self.entries.first().map_or(0, |e| e.term)
    }

    pub fn last_line(&self) -> usize {
        self.entries
            .last()
            .and_then(|e| e.definitions.last())
            .map_or(self.first_line(), DefinitionItem::last_line)
    }
}

fn is_definition_marker(scan: &LineScan) -> bool {
    scan.marker
        .as_ref()
        .is_some_and(|m| m.kind == MarkerKind::Definition)
}

fn is_term_candidate(scan: &LineScan) -> bool {
    !scan.blank
        && !scan.in_code
        && !scan.block_break
        && scan.marker.is_none()
        && scan.indent < DEFINITION_INDENT
}

/// Non-blank line above `i`, skipping at most one blank line.
fn line_above(scans: &[LineScan], i: usize) -> Option<usize> {
    let j = i.checked_sub(1)?;
    if !scans[j].blank {
        return Some(j);
    }
    let k = j.checked_sub(1)?;
    (!scans[k].blank).then_some(k)
}

pub fn extract_definitions(scans: &[LineScan]) -> Vec<DefinitionGroup> {
    let mut groups: Vec<DefinitionGroup> = Vec::new();
    let mut current: Option<DefinitionGroup> = None;
    let mut i = 0;

    while i < scans.len() {
        if !is_definition_marker(&scans[i]) {
            i += 1;
            continue;
        }
        let Some(above) = line_above(scans, i) else {
            i += 1;
            continue;
        };

        let continues_entry = current
            .as_ref()
            .is_some_and(|g| g.last_line() == above);
        if !continues_entry {
            if !is_term_candidate(&scans[above]) {
                i += 1;
                continue;
            }
            let joins_group = current.as_ref().is_some_and(|g| {
                above > g.last_line() && line_above(scans, above) == Some(g.last_line())
            });
            if !joins_group && let Some(done) = current.take() {
                groups.push(done);
            }
            current
                .get_or_insert_with(DefinitionGroup::default)
                .entries
                .push(DefinitionEntry {
                    term: above,
                    definitions: Vec::new(),
                });
        }

        let item = collect_item(scans, i);
        i = item.last_line() + 1;
        if let Some(entry) = current.as_mut().and_then(|g| g.entries.last_mut()) {
            entry.definitions.push(item);
        }
    }

    groups.extend(current);
    groups
}

fn collect_item(scans: &[LineScan], marker_line: usize) -> DefinitionItem {
    let mut item = DefinitionItem {
        marker_line,
        continuation: Vec::new(),
    };
    let mut j = marker_line + 1;
    let mut after_blank = false;
    while let Some(scan) = scans.get(j) {
        if scan.blank {
            after_blank = true;
            j += 1;
            continue;
        }
        let indented = scan.indent >= DEFINITION_INDENT;
        let lazy = !after_blank
            && scan.marker.is_none()
            && !scan.block_break
            && !scan.in_code;
        if !(indented || lazy) {
            break;
        }
        item.continuation.push(j);
        after_blank = false;
        j += 1;
    }
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        parsing::{rope::split_lines, scan::scan_lines},
        settings::ProcessingConfig,
    };
    use pretty_assertions::assert_eq;

    fn groups(text: &str) -> Vec<DefinitionGroup> {
        let lines = split_lines(text);
        let flags = vec![false; lines.len()];
        let scan = scan_lines(&lines, &flags, &ProcessingConfig::default());
        extract_definitions(&scan.lines)
    }

    #[test]
    fn term_and_two_definitions() {
        let g = groups("Apple\n: a fruit\n: a company\n");
        assert_eq!(g.len(), 1);
        assert_eq!(g[0].entries[0].term, 0);
        let markers: Vec<usize> = g[0].entries[0]
            .definitions
            .iter()
            .map(|d| d.marker_line)
            .collect();
        assert_eq!(markers, vec![1, 2]);
    }

    #[test]
    fn blank_between_term_and_definition_is_allowed() {
        let g = groups("Apple\n\n: a fruit\n");
        assert_eq!(g[0].entries[0].term, 0);
    }

    #[test]
    fn entries_separated_by_one_blank_share_a_group() {
        let g = groups("Apple\n: fruit\n\nPear\n: also fruit\n");
        assert_eq!(g.len(), 1);
        assert_eq!(g[0].entries.len(), 2);
        assert_eq!(g[0].last_line(), 4);
    }

    #[test]
    fn lazy_and_indented_continuations() {
        let g = groups("Term\n: first\nlazy\n\n    indented\n\nafter\n");
        let item = &g[0].entries[0].definitions[0];
        assert_eq!(item.continuation, vec![2, 4]);
    }

    #[test]
    fn marker_without_term_is_not_a_definition() {
        assert!(groups(": orphan\n").is_empty());
        assert!(groups("1. item\n: not a definition\n").is_empty());
        assert!(groups("Term\n\n\n: too far\n").is_empty());
    }
}
