//! The processor registry.
//!
//! Processors are plain function pairs: `detect` decides whether a processor
//! claims a line (structural) or an inline node, `build` produces its
//! output. Entries are kept sorted by priority and the first claiming entry
//! wins; later ones are not tried on that range. A failing `build` (an error
//! or a panic) is logged and reported as a diagnostic, and the rest of the
//! pass carries on.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::{
    error::{Diagnostic, ProcessError},
    labels::{DefinitionSite, LabelRegistry, ReferenceRecord},
    live::{decoration::Decoration, inline, structural},
    parsing::{
        analysis::LineRole,
        inline::InlineNode,
        rope::span::Span,
        scan::LineScan,
        types::ListItemRecord,
    },
    settings::ProcessingConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcessorKind {
    CustomLabel,
    Example,
    Hash,
    Fancy,
    Standard,
    Definition,
    Continuation,
    LabelReference,
    ExampleReference,
    Superscript,
    Subscript,
}

impl ProcessorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessorKind::CustomLabel => "custom-label",
            ProcessorKind::Example => "example",
            ProcessorKind::Hash => "hash",
            ProcessorKind::Fancy => "fancy",
            ProcessorKind::Standard => "standard",
            ProcessorKind::Definition => "definition",
            ProcessorKind::Continuation => "continuation",
            ProcessorKind::LabelReference => "label-reference",
            ProcessorKind::ExampleReference => "example-reference",
            ProcessorKind::Superscript => "superscript",
            ProcessorKind::Subscript => "subscript",
        }
    }
}

/// What a structural processor sees of one line.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    pub line: usize,
    pub scan: &'a LineScan,
    pub role: LineRole,
    pub record: Option<&'a ListItemRecord>,
    /// Label shown for this item before the current pass, for clamped items.
    pub last_known: Option<&'a str>,
    pub cursor: Option<usize>,
    pub config: &'a ProcessingConfig,
}

impl LineContext<'_> {
    /// Whether the cursor sits inside (or at either edge of) `span`.
    pub fn cursor_in(&self, span: Span) -> bool {
        self.cursor.is_some_and(|c| span.touches(c))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralOutput {
    pub decorations: Vec<Decoration>,
    /// Label definitions made by this line, by registry id.
    pub definitions: Vec<(String, DefinitionSite)>,
    /// Absolute offset where inline processing of the line starts; `None`
    /// leaves the line alone.
    pub inline_from: Option<usize>,
}

/// What an inline processor sees.
#[derive(Debug, Clone, Copy)]
pub struct InlineContext<'a> {
    pub registry: &'a LabelRegistry,
    /// Text of the line and its absolute start offset.
    pub text: &'a str,
    pub base: usize,
    pub cursor: Option<usize>,
    pub config: &'a ProcessingConfig,
}

impl InlineContext<'_> {
    pub fn slice(&self, span: Span) -> &str {
        self.text
            .get(span.start - self.base..span.end - self.base)
            .unwrap_or("")
    }

    pub fn cursor_in(&self, span: Span) -> bool {
        self.cursor.is_some_and(|c| span.touches(c))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineOutput {
    pub decorations: Vec<Decoration>,
    pub references: Vec<ReferenceRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

pub type StructuralDetect = fn(&LineContext<'_>) -> bool;
pub type StructuralBuild = fn(&LineContext<'_>) -> Result<StructuralOutput, ProcessError>;
pub type InlineDetect = fn(&InlineNode) -> bool;
pub type InlineBuild = fn(&InlineContext<'_>, &InlineNode) -> Result<InlineOutput, ProcessError>;

#[derive(Debug, Clone, Copy)]
pub enum Processor {
    Structural {
        detect: StructuralDetect,
        build: StructuralBuild,
    },
    Inline {
        detect: InlineDetect,
        build: InlineBuild,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ProcessorEntry {
    pub kind: ProcessorKind,
    pub priority: u32,
    pub processor: Processor,
}

/// Result of running the structural processors on one line.
#[derive(Debug, Clone, Default)]
pub struct StructuralRun {
    /// Priority of the claiming processor, if any.
    pub claimed_by: Option<(ProcessorKind, u32)>,
    pub output: StructuralOutput,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessorRegistry {
    entries: Vec<ProcessorEntry>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in processors at their fixed priorities.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (kind, priority, processor) in structural::defaults().into_iter().chain(inline::defaults()) {
            registry.register(kind, priority, processor);
        }
        registry
    }

    /// Adds a processor. Equal priorities keep registration order.
    pub fn register(&mut self, kind: ProcessorKind, priority: u32, processor: Processor) {
        let at = self.entries.partition_point(|e| e.priority <= priority);
        self.entries.insert(
            at,
            ProcessorEntry {
                kind,
                priority,
                processor,
            },
        );
    }

    pub fn entries(&self) -> &[ProcessorEntry] {
        &self.entries
    }

    pub fn priority_of(&self, kind: ProcessorKind) -> Option<u32> {
        self.entries.iter().find(|e| e.kind == kind).map(|e| e.priority)
    }

    /// Offers the line to each structural processor; the first whose
    /// `detect` accepts it builds. Lines nobody claims get inline processing
    /// on their whole content unless they are code.
    pub fn run_structural(&self, ctx: &LineContext<'_>) -> StructuralRun {
        let mut run = StructuralRun::default();
        for entry in &self.entries {
            let Processor::Structural { detect, build } = entry.processor else {
                continue;
            };
            if !guarded(entry.kind, ctx.scan.line.content, &mut run.diagnostics, || {
                Ok(detect(ctx))
            })
            .unwrap_or(false)
            {
                continue;
            }
            run.claimed_by = Some((entry.kind, entry.priority));
            match guarded(entry.kind, ctx.scan.line.content, &mut run.diagnostics, || build(ctx)) {
                Some(output) => run.output = output,
                None => {
                    run.output.decorations.push(Decoration::mark(
                        ctx.scan.line.content,
                        super::decoration::MarkKind::ProcessorFailed,
                    ));
                }
            }
            return run;
        }
        if !ctx.scan.in_code && !ctx.scan.blank {
            run.output.inline_from = Some(ctx.scan.line.content.start);
        }
        run
    }

    /// Runs inline processors over `nodes`; text nodes are never offered.
    pub fn run_inline(&self, ctx: &InlineContext<'_>, nodes: &[InlineNode]) -> InlineOutput {
        let mut out = InlineOutput::default();
        for node in nodes.iter().filter(|n| !n.is_text()) {
            for entry in &self.entries {
                let Processor::Inline { detect, build } = entry.processor else {
                    continue;
                };
                if !guarded(entry.kind, node.span(), &mut out.diagnostics, || Ok(detect(node)))
                    .unwrap_or(false)
                {
                    continue;
                }
                if let Some(mut built) =
                    guarded(entry.kind, node.span(), &mut out.diagnostics, || build(ctx, node))
                {
                    out.decorations.append(&mut built.decorations);
                    out.references.append(&mut built.references);
                    out.diagnostics.append(&mut built.diagnostics);
                }
                break;
            }
        }
        out
    }
}

/// Runs `f`, turning errors and panics into a diagnostic at `span`.
fn guarded<T>(
    kind: ProcessorKind,
    span: Span,
    diagnostics: &mut Vec<Diagnostic>,
    f: impl FnOnce() -> Result<T, ProcessError>,
) -> Option<T> {
    let error = match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => return Some(value),
        Ok(Err(error)) => error,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic".to_string());
            ProcessError::ProcessorFailed {
                processor: kind.as_str(),
                message,
            }
        }
    };
    log::warn!("{} processor failed at {}..{}: {error}", kind.as_str(), span.start, span.end);
    diagnostics.push(Diagnostic::new(span, error));
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{analysis::analyze_text, rope::split_lines};
    use pretty_assertions::assert_eq;

    fn always(_: &LineContext<'_>) -> bool {
        true
    }

    fn explode(_: &LineContext<'_>) -> Result<StructuralOutput, ProcessError> {
        panic!("boom")
    }

    fn refuse(_: &LineContext<'_>) -> Result<StructuralOutput, ProcessError> {
        Err(ProcessError::CascadeRenumberFailure {
            reason: "nope".into(),
        })
    }

    fn context<'a>(scan: &'a LineScan, config: &'a ProcessingConfig) -> LineContext<'a> {
        LineContext {
            line: 0,
            scan,
            role: LineRole::Text,
            record: None,
            last_known: None,
            cursor: None,
            config,
        }
    }

    #[test]
    fn defaults_are_sorted_by_priority() {
        let registry = ProcessorRegistry::with_defaults();
        let priorities: Vec<u32> = registry.entries().iter().map(|e| e.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
        assert_eq!(registry.entries()[0].kind, ProcessorKind::CustomLabel);
        assert_eq!(registry.entries().len(), 11);
    }

    #[test]
    fn panicking_processor_is_isolated() {
        let config = ProcessingConfig::default();
        let analysis = analyze_text("hello\n", &config);
        let mut registry = ProcessorRegistry::new();
        registry.register(
            ProcessorKind::Fancy,
            40,
            Processor::Structural {
                detect: always,
                build: explode,
            },
        );
        let run = registry.run_structural(&context(&analysis.lines[0], &config));
        assert_eq!(run.diagnostics.len(), 1);
        assert!(matches!(
            &run.diagnostics[0].error,
            ProcessError::ProcessorFailed { processor: "fancy", message } if message == "boom"
        ));
        assert_eq!(run.output.decorations.len(), 1);
    }

    #[test]
    fn first_claim_wins_even_when_it_fails() {
        let config = ProcessingConfig::default();
        let analysis = analyze_text("hello\n", &config);
        let mut registry = ProcessorRegistry::new();
        registry.register(
            ProcessorKind::Standard,
            50,
            Processor::Structural {
                detect: always,
                build: explode,
            },
        );
        registry.register(
            ProcessorKind::Hash,
            30,
            Processor::Structural {
                detect: always,
                build: refuse,
            },
        );
        let run = registry.run_structural(&context(&analysis.lines[0], &config));
        assert_eq!(run.claimed_by, Some((ProcessorKind::Hash, 30)));
        assert_eq!(run.diagnostics.len(), 1);
    }

    #[test]
    fn unclaimed_text_lines_get_inline_processing() {
        let config = ProcessingConfig::default();
        let lines = split_lines("plain\n");
        let analysis = analyze_text("plain\n", &config);
        let run = ProcessorRegistry::new().run_structural(&context(&analysis.lines[0], &config));
        assert_eq!(run.output.inline_from, Some(lines[0].content.start));
        assert!(run.claimed_by.is_none());
    }
}
