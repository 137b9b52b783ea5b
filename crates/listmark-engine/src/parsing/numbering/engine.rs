use crate::{
    error::{Diagnostic, ProcessError},
    parsing::{
        extract::PlaceholderTable,
        types::{
            ItemLabel, ListFamily, ListId, ListItemRecord, MarkerToken, NumberStyle,
            NumberingStatus,
        },
    },
    settings::{ContinuationPolicy, ProcessingConfig},
};

use super::alphabet::format_ordinal;

/// Deepest nesting that gets its own counter. Deeper items are numbered as
/// siblings of the deepest level and flagged [`NumberingStatus::Clamped`].
pub const MAX_DEPTH: usize = 16;

/// One document line as the engine sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEntry<'a> {
    Item { line: usize, token: &'a MarkerToken },
    Blank { line: usize },
    /// Non-list text with its indentation in columns.
    Prose { line: usize, indent: usize },
    /// Fenced code; `indent` is the indentation of its opening fence.
    Code { line: usize, indent: usize },
    /// Headings, thematic breaks and definition lists.
    Break { line: usize },
}

/// The label one token received from [`renumber_run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub label: ItemLabel,
    pub started_new: bool,
}

/// A non-marker line that belongs to the item `record`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinuationLine {
    pub line: usize,
    pub record: usize,
    pub depth: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Numbering {
    pub records: Vec<ListItemRecord>,
    pub continuations: Vec<ContinuationLine>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turns tokens into labels. Owns the counters that span the whole document:
/// example numbers and custom label placeholders.
struct Labeler<'c> {
    config: &'c ProcessingConfig,
    placeholders: PlaceholderTable,
    examples: u32,
    diagnostics: Vec<Diagnostic>,
}

impl<'c> Labeler<'c> {
    fn new(config: &'c ProcessingConfig) -> Self {
        Self {
            config,
            placeholders: PlaceholderTable::new(),
            examples: 0,
            diagnostics: Vec::new(),
        }
    }

    fn label(&mut self, token: &MarkerToken, counter: &mut u32, started_new: bool) -> ItemLabel {
        match token.style {
            NumberStyle::Example => {
                self.examples += 1;
                ItemLabel {
                    ordinal: self.examples,
                    text: self.examples.to_string(),
                    display: self.config.format_example(self.examples),
                }
            }
            NumberStyle::Label => {
                let expanded = self
                    .placeholders
                    .expand(token.label.as_deref().unwrap_or_default());
                ItemLabel {
                    ordinal: 0,
                    display: self.config.custom_label().display(&expanded),
                    text: expanded,
                }
            }
            NumberStyle::Bullet => ItemLabel {
                ordinal: 0,
                text: self.config.bullet().to_string(),
                display: self.config.bullet().to_string(),
            },
            NumberStyle::Definition => ItemLabel {
                ordinal: 0,
                text: String::new(),
                display: String::new(),
            },
            style => {
                if token.malformed_literal {
                    self.diagnostics.push(Diagnostic::new(
                        token.span(),
                        ProcessError::MalformedManualNumber {
                            raw: token.raw.clone(),
                        },
                    ));
                }
                let literal = token.literal.filter(|_| !token.malformed_literal);
                let honor = self.config.settings().honor_literal_numbers;
                *counter = match literal {
                    Some(n) if started_new => n,
                    Some(n) if honor && n != *counter + 1 => n,
                    _ if started_new => 1,
                    _ => *counter + 1,
                };
                let text = format_ordinal(*counter, style);
                let display = if style == NumberStyle::Hash {
                    self.config.format_hash(*counter)
                } else {
                    token.delimiter.wrap(&text)
                };
                ItemLabel {
                    ordinal: *counter,
                    text,
                    display,
                }
            }
        }
    }
}

/// Counter state of one list level: the single-level primitive behind both
/// [`renumber_run`] and [`renumber_document`].
#[derive(Debug, Clone, Default)]
struct Run {
    family: Option<ListFamily>,
    counter: u32,
}

impl Run {
    /// Labels the next token; a family change starts a new list.
    fn assign(&mut self, token: &MarkerToken, labeler: &mut Labeler<'_>) -> Assignment {
        let started_new = self.family != Some(token.family());
        self.assign_as(token, labeler, started_new)
    }

    fn assign_as(
        &mut self,
        token: &MarkerToken,
        labeler: &mut Labeler<'_>,
        started_new: bool,
    ) -> Assignment {
        if started_new {
            self.family = Some(token.family());
        }
        Assignment {
            label: labeler.label(token, &mut self.counter, started_new),
            started_new,
        }
    }
}

/// Numbers one run of sibling tokens. `continue_from` is the counter value
/// of the item just before the run, if the run continues a list; a family
/// change inside the run starts a new list.
pub fn renumber_run(
    tokens: &[MarkerToken],
    continue_from: Option<u32>,
    config: &ProcessingConfig,
) -> Vec<Assignment> {
    let mut labeler = Labeler::new(config);
    let mut run = Run {
        family: continue_from.and(tokens.first().map(MarkerToken::family)),
        counter: continue_from.unwrap_or(0),
    };
    labeler.examples = run.counter;
    tokens
        .iter()
        .map(|token| run.assign(token, &mut labeler))
        .collect()
}

#[derive(Debug, Clone)]
struct Level {
    indent: usize,
    run: Run,
    list_id: ListId,
    siblings: usize,
    last_record: usize,
}

impl Level {
    fn holds(&self, family: ListFamily) -> bool {
        self.run.family == Some(family)
    }
}

/// Numbers every item of a document.
///
/// Levels are keyed by indent: a deeper item opens a nested list, a
/// shallower one closes everything deeper. See [`ContinuationPolicy`] for
/// what unindented prose does to open lists.
pub fn renumber_document(entries: &[ListEntry<'_>], config: &ProcessingConfig) -> Numbering {
    let need = config.settings().continuation_indent;
    let policy = config.settings().continuation_policy;

    let mut labeler = Labeler::new(config);
    let mut out = Numbering::default();
    let mut levels: Vec<Level> = Vec::new();
    let mut suspended: Vec<Level> = Vec::new();
    let mut next_list = 0u32;
    let mut after_blank = false;
    let mut in_item = false;

    let continuing_level = |levels: &[Level], indent: usize| {
        levels.iter().rposition(|l| indent >= l.indent + need)
    };

    for entry in entries {
        match *entry {
            ListEntry::Item { line, token } => {
                while levels.last().is_some_and(|l| l.indent > token.indent) {
                    levels.pop();
                }
                if levels.is_empty() && !suspended.is_empty() {
                    if let Some(pos) = suspended
                        .iter()
                        .position(|l| l.indent == token.indent && l.holds(token.family()))
                    {
                        levels = suspended.drain(..=pos).collect();
                    }
                    suspended.clear();
                }

                let same_indent = levels.last().is_some_and(|l| l.indent == token.indent);
                let mut status = NumberingStatus::Ok;
                if !(same_indent && levels.last().is_some_and(|l| l.holds(token.family()))) {
                    if same_indent {
                        levels.pop();
                    }
                    if levels.len() >= MAX_DEPTH {
                        status = NumberingStatus::Clamped;
                        out.diagnostics.push(Diagnostic::new(
                            token.span(),
                            ProcessError::CascadeRenumberFailure {
                                reason: format!("list nesting deeper than {MAX_DEPTH} levels"),
                            },
                        ));
                    } else {
                        levels.push(Level {
                            indent: token.indent,
                            run: Run::default(),
                            list_id: ListId(next_list),
                            siblings: 0,
                            last_record: 0,
                        });
                        next_list += 1;
                    }
                }

                let depth = levels.len().saturating_sub(1);
                let record_index = out.records.len();
                let Some(level) = levels.last_mut() else {
                    continue;
                };
                // Clamped items continue the deepest level whatever their family.
                let Assignment { label, started_new } = match status {
                    NumberingStatus::Clamped => level.run.assign_as(token, &mut labeler, false),
                    _ => level.run.assign(token, &mut labeler),
                };
                out.records.push(ListItemRecord {
                    line,
                    token: token.clone(),
                    label,
                    list_id: level.list_id,
                    depth,
                    sibling_index: level.siblings,
                    started_new,
                    status,
                });
                level.siblings += 1;
                level.last_record = record_index;
                after_blank = false;
                in_item = true;
            }
            ListEntry::Blank { .. } => after_blank = true,
            ListEntry::Prose { line, indent } => {
                let owner = if levels.is_empty() {
                    None
                } else if in_item && !after_blank {
                    Some(levels.len() - 1)
                } else {
                    continuing_level(&levels, indent)
                };
                match owner {
                    Some(idx) => {
                        levels.truncate(idx + 1);
                        out.continuations.push(ContinuationLine {
                            line,
                            record: levels[idx].last_record,
                            depth: idx,
                        });
                        in_item = true;
                    }
                    None => {
                        match policy {
                            ContinuationPolicy::Strict => {
                                levels.clear();
                                suspended.clear();
                            }
                            ContinuationPolicy::Loose => {
                                if !levels.is_empty() {
                                    suspended = std::mem::take(&mut levels);
                                }
                            }
                        }
                        in_item = false;
                    }
                }
                after_blank = false;
            }
            ListEntry::Code { line, indent } => {
                match continuing_level(&levels, indent) {
                    Some(idx) => {
                        levels.truncate(idx + 1);
                        out.continuations.push(ContinuationLine {
                            line,
                            record: levels[idx].last_record,
                            depth: idx,
                        });
                        in_item = true;
                    }
                    None => {
                        levels.clear();
                        suspended.clear();
                        in_item = false;
                    }
                }
                after_blank = false;
            }
            ListEntry::Break { .. } => {
                levels.clear();
                suspended.clear();
                in_item = false;
                after_blank = false;
            }
        }
    }

    out.diagnostics.append(&mut labeler.diagnostics);
    out.diagnostics.sort_by_key(|d| d.span.start);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        parsing::{
            rope::split_lines,
            scan::{LineScan, scan_lines},
        },
        settings::Settings,
    };
    use pretty_assertions::assert_eq;

    fn scans(text: &str) -> Vec<LineScan> {
        let lines = split_lines(text);
        let flags = vec![false; lines.len()];
        scan_lines(&lines, &flags, &ProcessingConfig::default()).lines
    }

    fn entries(scans: &[LineScan]) -> Vec<ListEntry<'_>> {
        scans
            .iter()
            .enumerate()
            .map(|(line, s)| match &s.marker {
                Some(token) => ListEntry::Item { line, token },
                None if s.blank => ListEntry::Blank { line },
                None if s.block_break => ListEntry::Break { line },
                None => ListEntry::Prose {
                    line,
                    indent: s.indent,
                },
            })
            .collect()
    }

    fn labels_with(text: &str, config: &ProcessingConfig) -> Vec<String> {
        let scans = scans(text);
        renumber_document(&entries(&scans), config)
            .records
            .into_iter()
            .map(|r| r.label.display)
            .collect()
    }

    fn labels(text: &str) -> Vec<String> {
        labels_with(text, &ProcessingConfig::default())
    }

    #[test]
    fn decimal_run_counts_up() {
        assert_eq!(labels("1. a\n1. b\n1. c\n"), vec!["1.", "2.", "3."]);
    }

    #[test]
    fn first_literal_sets_start() {
        assert_eq!(labels("3) a\n7) b\n"), vec!["3)", "4)"]);
    }

    #[test]
    fn deleting_middle_item_renumbers_rest() {
        assert_eq!(labels("1. a\n3. c\n"), vec!["1.", "2."]);
    }

    #[test]
    fn honoring_literals_resets_counter() {
        let cfg = Settings {
            honor_literal_numbers: true,
            ..Settings::default()
        }
        .compile()
        .unwrap();
        assert_eq!(labels_with("1. a\n2. b\n7. c\n8. d\n", &cfg), vec!["1.", "2.", "7.", "8."]);
    }

    #[test]
    fn twenty_seventh_letter_is_aa() {
        let text: String = (0..27).map(|_| "a. x\n").collect();
        let got = labels(&text);
        assert_eq!(got[25], "z.");
        assert_eq!(got[26], "aa.");
    }

    #[test]
    fn family_change_starts_new_list() {
        let scans = scans("1. a\n2. b\n1) c\n- d\n");
        let numbering = renumber_document(&entries(&scans), &ProcessingConfig::default());
        let started: Vec<bool> = numbering.records.iter().map(|r| r.started_new).collect();
        assert_eq!(started, vec![true, false, true, true]);
        assert_eq!(numbering.records[2].label.display, "1)");
        assert_eq!(numbering.records[3].label.display, "•");
    }

    #[test]
    fn nested_levels_count_independently_and_restart() {
        let got = labels("1. a\n   a. x\n   b. y\n2. b\n   a. z\n");
        assert_eq!(got, vec!["1.", "a.", "b.", "2.", "a."]);
    }

    #[test]
    fn examples_share_one_counter_across_lists() {
        let got = labels("(@) one\n\ntext\n\n(@good) two\n   (@) nested\n");
        assert_eq!(got, vec!["(1)", "(2)", "(3)"]);
    }

    #[test]
    fn hash_and_custom_labels() {
        assert_eq!(labels("#. a\n#. b\n"), vec!["1.", "2."]);
        assert_eq!(labels("(foo) a\n(P(#x)) b\n"), vec!["(foo)", "(P1)"]);
    }

    #[test]
    fn strict_prose_closes_and_loose_suspends() {
        let text = "1. a\n2. b\n\nprose\n\n1. c\n";
        assert_eq!(labels(text), vec!["1.", "2.", "1."]);

        let loose = Settings {
            continuation_policy: ContinuationPolicy::Loose,
            ..Settings::default()
        }
        .compile()
        .unwrap();
        assert_eq!(labels_with(text, &loose), vec!["1.", "2.", "3."]);
    }

    #[test]
    fn indented_prose_continues_the_item() {
        let scans = scans("1. a\n\n   more\n\n2. b\n");
        let numbering = renumber_document(&entries(&scans), &ProcessingConfig::default());
        assert_eq!(numbering.records[1].label.display, "2.");
        assert_eq!(
            numbering.continuations,
            vec![ContinuationLine {
                line: 2,
                record: 0,
                depth: 0
            }]
        );
    }

    #[test]
    fn lazy_line_continues_without_indent() {
        let scans = scans("1. a\nlazy\n2. b\n");
        let numbering = renumber_document(&entries(&scans), &ProcessingConfig::default());
        assert_eq!(numbering.continuations.len(), 1);
        assert_eq!(numbering.records[1].label.display, "2.");
    }

    #[test]
    fn headings_close_lists_in_loose_mode_too() {
        let loose = Settings {
            continuation_policy: ContinuationPolicy::Loose,
            ..Settings::default()
        }
        .compile()
        .unwrap();
        assert_eq!(labels_with("1. a\n# H\n1. b\n", &loose), vec!["1.", "1."]);
    }

    #[test]
    fn malformed_literal_falls_back_with_diagnostic() {
        let scans = scans("1234567890. a\n5. b\n");
        let numbering = renumber_document(&entries(&scans), &ProcessingConfig::default());
        let got: Vec<&str> = numbering
            .records
            .iter()
            .map(|r| r.label.display.as_str())
            .collect();
        assert_eq!(got, vec!["1.", "2."]);
        assert!(matches!(
            numbering.diagnostics[0].error,
            ProcessError::MalformedManualNumber { .. }
        ));
    }

    #[test]
    fn excessive_depth_is_clamped() {
        let text: String = (0..20)
            .map(|d| format!("{}- x\n", " ".repeat(d * 2)))
            .collect();
        let scans = scans(&text);
        let numbering = renumber_document(&entries(&scans), &ProcessingConfig::default());
        assert_eq!(numbering.records.len(), 20);
        assert!(numbering.records.iter().all(|r| r.depth < MAX_DEPTH));
        assert_eq!(
            numbering
                .records
                .iter()
                .filter(|r| r.status == NumberingStatus::Clamped)
                .count(),
            4
        );
        assert!(numbering.diagnostics.iter().all(|d| matches!(
            d.error,
            ProcessError::CascadeRenumberFailure { .. }
        )));
    }

    #[test]
    fn renumbering_is_idempotent() {
        let scans = scans("1. a\n   i. x\n   ii. y\n2. b\n(@) e\n");
        let cfg = ProcessingConfig::default();
        let first = renumber_document(&entries(&scans), &cfg);
        let second = renumber_document(&entries(&scans), &cfg);
        assert_eq!(first, second);
    }

    #[test]
    fn document_and_run_agree_on_a_flat_run() {
        let text = "3. a\n4. b\na) c\nb) d\n";
        let scans = scans(text);
        let tokens: Vec<MarkerToken> = scans.iter().filter_map(|s| s.marker.clone()).collect();
        let run: Vec<String> = renumber_run(&tokens, None, &ProcessingConfig::default())
            .into_iter()
            .map(|a| a.label.display)
            .collect();
        assert_eq!(run, vec!["3.", "4.", "a)", "b)"]);
        assert_eq!(labels(text), run);
    }

    #[test]
    fn run_continues_from_previous_value() {
        let scans = scans("1. a\n1. b\n");
        let tokens: Vec<MarkerToken> = scans.iter().filter_map(|s| s.marker.clone()).collect();
        let cfg = ProcessingConfig::default();
        let fresh = renumber_run(&tokens, None, &cfg);
        assert!(fresh[0].started_new);
        assert_eq!(fresh[1].label.display, "2.");

        let continued = renumber_run(&tokens, Some(4), &cfg);
        assert!(!continued[0].started_new);
        assert_eq!(continued[0].label.display, "5.");
        assert_eq!(continued[1].label.display, "6.");
    }
}
