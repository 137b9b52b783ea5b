//! Whole-document analysis shared by both modes.
//!
//! Given scanned lines, decides each line's role (item, continuation,
//! definition part, plain text...) and runs the renumbering engine. The live
//! pipeline and the reading renderer both consume an [`Analysis`], which is
//! what keeps their numbering identical.

use crate::{
    error::Diagnostic,
    parsing::{
        code::CodeRegions,
        extract::{DefinitionGroup, extract_definitions},
        numbering::{ListEntry, renumber_document},
        rope::split_lines,
        scan::{LineScan, scan_lines},
        types::{ListItemRecord, MarkerKind},
    },
    settings::ProcessingConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineRole {
    Blank,
    Code,
    /// Heading or thematic break.
    Break,
    Text,
    Item { record: usize },
    Continuation { record: usize, depth: usize },
    DefinitionTerm { group: usize },
    DefinitionMarker { group: usize },
    DefinitionContinuation { group: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub lines: Vec<LineScan>,
    pub roles: Vec<LineRole>,
    pub records: Vec<ListItemRecord>,
    pub definitions: Vec<DefinitionGroup>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    pub fn record_at_line(&self, line: usize) -> Option<&ListItemRecord> {
        match self.roles.get(line)? {
            LineRole::Item { record } => self.records.get(*record),
            _ => None,
        }
    }

    /// Displayed labels of all items, in document order.
    pub fn labels(&self) -> Vec<String> {
        self.records.iter().map(|r| r.label.display.clone()).collect()
    }
}

/// Analyses already scanned lines.
pub fn analyze(lines: Vec<LineScan>, config: &ProcessingConfig) -> Analysis {
    let definitions = extract_definitions(&lines);
    let mut roles = vec![LineRole::Text; lines.len()];
    for (g, group) in definitions.iter().enumerate() {
        for entry in &group.entries {
            roles[entry.term] = LineRole::DefinitionTerm { group: g };
            for def in &entry.definitions {
                roles[def.marker_line] = LineRole::DefinitionMarker { group: g };
                for &l in &def.continuation {
                    roles[l] = LineRole::DefinitionContinuation { group: g };
                }
            }
        }
    }

    let mut entries = Vec::with_capacity(lines.len());
    let mut fence_indent = None;
    for (line, scan) in lines.iter().enumerate() {
        if scan.in_code {
            let indent = *fence_indent.get_or_insert(scan.indent);
            roles[line] = LineRole::Code;
            entries.push(ListEntry::Code { line, indent });
            continue;
        }
        fence_indent = None;

        if !matches!(roles[line], LineRole::Text) {
            entries.push(ListEntry::Break { line });
            continue;
        }
        let entry = match &scan.marker {
            _ if scan.blank => {
                roles[line] = LineRole::Blank;
                ListEntry::Blank { line }
            }
            _ if scan.block_break => {
                roles[line] = LineRole::Break;
                ListEntry::Break { line }
            }
            Some(token) if token.kind != MarkerKind::Definition => ListEntry::Item { line, token },
            _ => ListEntry::Prose {
                line,
                indent: scan.indent,
            },
        };
        entries.push(entry);
    }

    let numbering = renumber_document(&entries, config);
    for (i, record) in numbering.records.iter().enumerate() {
        roles[record.line] = LineRole::Item { record: i };
    }
    for c in &numbering.continuations {
        if roles[c.line] == LineRole::Text || roles[c.line] == LineRole::Code {
            roles[c.line] = LineRole::Continuation {
                record: c.record,
                depth: c.depth,
            };
        }
    }

    let mut diagnostics: Vec<Diagnostic> = lines
        .iter()
        .filter_map(|l| l.ambiguity.clone())
        .chain(numbering.diagnostics)
        .collect();
    diagnostics.sort_by_key(|d| d.span.start);

    Analysis {
        lines,
        roles,
        records: numbering.records,
        definitions,
        diagnostics,
    }
}

/// Splits, detects code blocks, scans and analyses `text` in one go.
pub fn analyze_text(text: &str, config: &ProcessingConfig) -> Analysis {
    let lines = split_lines(text);
    let flags = CodeRegions::parse(text).line_flags(&lines);
    analyze(scan_lines(&lines, &flags, config).lines, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn roles_cover_every_line() {
        let a = analyze_text(
            "1. a\n   more\n\nTerm\n: def\n\n```\n2. code\n```\n# H\n",
            &ProcessingConfig::default(),
        );
        assert_eq!(
            a.roles,
            vec![
                LineRole::Item { record: 0 },
                LineRole::Continuation {
                    record: 0,
                    depth: 0
                },
                LineRole::Blank,
                LineRole::DefinitionTerm { group: 0 },
                LineRole::DefinitionMarker { group: 0 },
                LineRole::Blank,
                LineRole::Code,
                LineRole::Code,
                LineRole::Code,
                LineRole::Break,
            ]
        );
        assert_eq!(a.records.len(), 1);
    }

    #[test]
    fn code_block_items_are_never_counted() {
        let a = analyze_text("1. a\n\n```\n2. b\n```\n\n1. c\n", &ProcessingConfig::default());
        assert_eq!(a.labels(), vec!["1.", "1."]);
    }

    #[test]
    fn orphan_definition_marker_is_text() {
        let a = analyze_text(": orphan\n", &ProcessingConfig::default());
        assert_eq!(a.roles, vec![LineRole::Text]);
        assert!(a.records.is_empty());
    }

    #[test]
    fn ambiguity_becomes_a_diagnostic() {
        let a = analyze_text("B. Russell\n", &ProcessingConfig::default());
        assert_eq!(a.diagnostics.len(), 1);
        assert_eq!(a.roles, vec![LineRole::Text]);
    }
}
