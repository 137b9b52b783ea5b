//! Live decorations and reading-mode output must agree on every item label,
//! both for fresh documents and after incremental edits (inserts, deletes
//! and line replacements, fences inside items included).

use listmark_engine::{
    Cmd, DecorationKind, Document, LivePipeline, ProcessingConfig, Widget, parsing::analyze_text,
    reading::parse_document,
};
use proptest::prelude::*;

const VOCAB: &[&str] = &[
    "1. one",
    "2. two",
    "a. alpha",
    "b) beta",
    "(i) roman",
    "#. hash",
    "(@) example",
    "(@q) labelled example",
    "(foo) custom",
    "(P(#a)) placeholder",
    "- bullet",
    "* star",
    "   - nested",
    "   1. nested",
    "      a. deeper",
    "   continued",
    "text",
    "",
    "Term",
    ": definition",
    "```",
    "   ```",
    "~~~",
    "   (foo) inside a fence",
    "   2. inside a fence",
    "# Heading",
    "See \\ref{foo} and (@q).",
];

fn live_labels(pipeline: &LivePipeline) -> Vec<String> {
    pipeline
        .decorations()
        .into_iter()
        .filter_map(|d| match d.kind {
            DecorationKind::Replace(
                Widget::ListMarker { display, .. }
                | Widget::ExampleNumber { display, .. }
                | Widget::CustomLabel { display, .. },
            ) => Some(display),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Clone)]
enum Edit {
    Insert(usize, &'static str),
    Delete(usize),
    Replace(usize, &'static str),
}

fn line() -> impl Strategy<Value = &'static str> {
    prop::sample::select(VOCAB.to_vec())
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..32, line()).prop_map(|(at, text)| Edit::Insert(at, text)),
        (0usize..32).prop_map(Edit::Delete),
        (0usize..32, line()).prop_map(|(at, text)| Edit::Replace(at, text)),
    ]
}

fn apply(doc: &mut Document, edit: &Edit) {
    let line_range = |doc: &Document, line: usize| doc.offset_of_line(line)..doc.offset_of_line(line + 1);
    let cmd = match *edit {
        Edit::Insert(line, text) => Cmd::InsertText {
            at: doc.offset_of_line(line),
            text: format!("{text}\n"),
        },
        Edit::Delete(line) => Cmd::DeleteRange {
            range: line_range(doc, line),
        },
        Edit::Replace(line, text) => Cmd::ReplaceRange {
            range: line_range(doc, line),
            text: format!("{text}\n"),
        },
    };
    doc.apply(cmd);
}

fn document() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(line(), 0..24)
}

fn join(lines: &[&str]) -> String {
    lines.iter().map(|l| format!("{l}\n")).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fresh_documents_number_alike(lines in document()) {
        let text = join(&lines);
        let config = ProcessingConfig::default();

        let analysis = analyze_text(&text, &config).labels();
        let reading = parse_document(&text, &config).root.numbers();
        let mut pipeline = LivePipeline::new(config);
        pipeline.process(&Document::from_bytes(text.as_bytes()).unwrap()).unwrap();

        prop_assert_eq!(&reading, &analysis);
        prop_assert_eq!(live_labels(&pipeline), analysis);
    }

    #[test]
    fn edits_keep_live_and_reading_in_step(
        lines in document(),
        edits in prop::collection::vec(edit(), 1..8),
    ) {
        let config = ProcessingConfig::default();
        let mut doc = Document::from_bytes(join(&lines).as_bytes()).unwrap();
        let mut pipeline = LivePipeline::new(config.clone());
        pipeline.process(&doc).unwrap();

        for edit in &edits {
            apply(&mut doc, edit);
            pipeline.process(&doc).unwrap();

            let text = doc.text();
            let fresh = analyze_text(&text, &config);
            let reading = parse_document(&text, &config).root.numbers();
            prop_assert_eq!(&pipeline.analysis().unwrap().roles, &fresh.roles);
            prop_assert_eq!(&reading, &fresh.labels());
            prop_assert_eq!(live_labels(&pipeline), reading);
        }
    }
}
