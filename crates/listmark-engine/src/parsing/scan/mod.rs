//! # Scanners
//!
//! Pure per-line marker detection. [`scan_line`] offers a line to each
//! enabled kind in fixed precedence (custom label, example, hash, fancy,
//! standard, definition) and returns the first token produced. Scanners fail
//! closed: anything doubtful is not a marker, and the detailed variant says
//! why.
//!
//! [`scan_lines`] drives the scanners over a whole document and threads a
//! [`ScanState`] (the open marker at each indent) from line to line. The live
//! pipeline uses [`scan_one`] directly to rescan only an edited region until
//! the state converges.

pub mod custom_label;
pub mod definition;
pub mod example;
pub mod fancy;
pub mod hash;
pub mod standard;

use regex::{Captures, Regex};

use crate::{
    error::{Diagnostic, ProcessError},
    parsing::{
        inline::code_spans,
        patterns::{self, leading_indent},
        rope::{lines::LineRef, span::Span},
        types::{Delimiter, ListFamily, MarkerKind, MarkerToken, NumberStyle},
    },
    settings::ProcessingConfig,
};

/// The most recent marker seen at one indent, while its list is open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpenMarker {
    pub indent: usize,
    pub family: ListFamily,
    pub literal: Option<u32>,
}

/// What a scanner may know about the lines before the one it scans.
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    /// Absolute byte offset of the line.
    pub line_start: usize,
    pub in_code_block: bool,
    pub open: &'a [OpenMarker],
    pub config: &'a ProcessingConfig,
}

impl<'a> ScanContext<'a> {
    pub fn new(line_start: usize, open: &'a [OpenMarker], config: &'a ProcessingConfig) -> Self {
        Self {
            line_start,
            in_code_block: false,
            open,
            config,
        }
    }

    /// The open marker at exactly `indent`, if any.
    pub fn previous_at(&self, indent: usize) -> Option<&'a OpenMarker> {
        self.open.iter().rev().find(|m| m.indent == indent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Marker(MarkerToken),
    /// Looks like a marker but is treated as text.
    Ambiguous { text: String, reason: &'static str },
    NotMarker,
}

/// Scans one line. `None` for anything that is not a marker.
pub fn scan_line(text: &str, ctx: &ScanContext<'_>) -> Option<MarkerToken> {
    match scan_line_detailed(text, ctx) {
        ScanOutcome::Marker(token) => Some(token),
        _ => None,
    }
}

/// Like [`scan_line`], but explains near misses.
pub fn scan_line_detailed(text: &str, ctx: &ScanContext<'_>) -> ScanOutcome {
    if ctx.in_code_block || patterns::is_heading(text) || patterns::is_thematic_break(text) {
        return ScanOutcome::NotMarker;
    }

    let mut ambiguous = None;
    for kind in MarkerKind::ALL {
        if !ctx.config.is_enabled(kind) {
            continue;
        }
        let outcome = match kind {
            MarkerKind::CustomLabel => custom_label::scan(text, ctx),
            MarkerKind::Example => example::scan(text, ctx),
            MarkerKind::Hash => hash::scan(text, ctx),
            MarkerKind::Fancy => fancy::scan(text, ctx),
            MarkerKind::Standard => standard::scan(text, ctx),
            MarkerKind::Definition => definition::scan(text, ctx),
        };
        match outcome {
            ScanOutcome::Marker(mut token) => {
                let local = Span::new(token.start - ctx.line_start, token.end - ctx.line_start);
                if code_spans(0, text).iter().any(|c| c.overlaps(local)) {
                    return ScanOutcome::Ambiguous {
                        text: token.raw,
                        reason: "marker is inside inline code",
                    };
                }
                token.is_continuation = continues(ctx, &token);
                return ScanOutcome::Marker(token);
            }
            ScanOutcome::Ambiguous { .. } if ambiguous.is_none() => ambiguous = Some(outcome),
            _ => {}
        }
    }
    ambiguous.unwrap_or(ScanOutcome::NotMarker)
}

/// One regex match of a marker shape at the start of a line.
pub(crate) struct MarkerMatch<'t> {
    caps: Captures<'t>,
    pub indent: usize,
}

impl<'t> MarkerMatch<'t> {
    /// Matches `re` (which must define `indent`, `marker` and `ws` groups).
    pub fn find(re: &Regex, text: &'t str) -> Option<Self> {
        let caps = re.captures(text)?;
        let indent_text = caps.name("indent").map_or("", |m| m.as_str());
        let (indent, _) = leading_indent(indent_text);
        Some(Self { caps, indent })
    }

    pub fn group(&self, name: &str) -> Option<&'t str> {
        self.caps.name(name).map(|m| m.as_str())
    }

    pub fn marker(&self) -> &'t str {
        self.group("marker").unwrap_or_default()
    }

    /// Whitespace between the marker and the item text.
    pub fn gap(&self) -> &'t str {
        self.group("ws").unwrap_or_default()
    }

    /// Builds a token with the shared fields filled in.
    pub fn token(
        &self,
        ctx: &ScanContext<'_>,
        kind: MarkerKind,
        style: NumberStyle,
        delimiter: Delimiter,
    ) -> MarkerToken {
        let (start, end) = self
            .caps
            .name("marker")
            .map_or((0, 0), |m| (m.start(), m.end()));
        let content = self.caps.name("ws").map_or(end, |m| m.end());
        MarkerToken {
            kind,
            style,
            delimiter,
            raw: self.marker().to_string(),
            indent: self.indent,
            start: ctx.line_start + start,
            end: ctx.line_start + end,
            content_start: ctx.line_start + content,
            label: None,
            literal: None,
            malformed_literal: false,
            is_continuation: false,
            bullet: None,
        }
    }
}

/// Whether `token` belongs to the same list as the open marker at its indent.
pub(crate) fn continues(ctx: &ScanContext<'_>, token: &MarkerToken) -> bool {
    ctx.previous_at(token.indent)
        .is_some_and(|prev| prev.family == token.family())
}

/// Scanner state carried from one line to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScanState {
    pub open: Vec<OpenMarker>,
    pub after_blank: bool,
}

impl ScanState {
    /// Folds one scanned line into the state.
    pub fn advance(&mut self, line: &LineScan, config: &ProcessingConfig) {
        if line.blank {
            self.after_blank = true;
            return;
        }
        let after_blank = std::mem::replace(&mut self.after_blank, false);
        if line.in_code {
            return;
        }
        if line.block_break {
            self.open.clear();
            return;
        }
        match &line.marker {
            Some(token) if token.kind == MarkerKind::Definition => self.open.clear(),
            Some(token) => {
                self.open.retain(|m| m.indent < token.indent);
                self.open.push(OpenMarker {
                    indent: token.indent,
                    family: token.family(),
                    literal: token.literal,
                });
            }
            None if after_blank => {
                let need = config.settings().continuation_indent;
                while self
                    .open
                    .last()
                    .is_some_and(|m| line.indent < m.indent + need)
                {
                    self.open.pop();
                }
            }
            None => {}
        }
    }
}

/// Everything the scanners found out about one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineScan {
    pub line: LineRef,
    /// Leading indentation in columns.
    pub indent: usize,
    pub blank: bool,
    pub in_code: bool,
    /// ATX heading or thematic break.
    pub block_break: bool,
    pub marker: Option<MarkerToken>,
    /// Present when the line looked like a marker but was rejected.
    pub ambiguity: Option<Diagnostic>,
}

impl LineScan {
    pub fn text(&self) -> &str {
        &self.line.text
    }

    /// Copy moved by `delta` bytes, for lines below an edit.
    pub fn shifted(&self, delta: isize) -> LineScan {
        let mut line = self.line.clone();
        line.span = line.span.shifted(delta);
        line.content = line.content.shifted(delta);
        LineScan {
            line,
            marker: self.marker.as_ref().map(|m| m.shifted(delta)),
            ambiguity: self.ambiguity.as_ref().map(|d| d.shifted(delta)),
            ..self.clone()
        }
    }

    /// Equal apart from byte positions.
    pub fn same_shape(&self, other: &LineScan) -> bool {
        let delta = other.line.span.start as isize - self.line.span.start as isize;
        &self.shifted(delta) == other
    }
}

/// Scans one line against `state` and advances it.
pub fn scan_one(
    line: &LineRef,
    in_code: bool,
    state: &mut ScanState,
    config: &ProcessingConfig,
) -> LineScan {
    let blank = line.is_blank();
    let (indent, _) = leading_indent(&line.text);
    let block_break =
        !in_code && (patterns::is_heading(&line.text) || patterns::is_thematic_break(&line.text));

    let (marker, ambiguity) = if blank || in_code {
        (None, None)
    } else {
        let ctx = ScanContext {
            line_start: line.content.start,
            in_code_block: in_code,
            open: &state.open,
            config,
        };
        match scan_line_detailed(&line.text, &ctx) {
            ScanOutcome::Marker(token) => (Some(token), None),
            ScanOutcome::Ambiguous { text, reason } => {
                log::trace!("ambiguous marker `{text}` at byte {}: {reason}", line.content.start);
                let diag = Diagnostic::new(line.content, ProcessError::ScanAmbiguous { text, reason });
                (None, Some(diag))
            }
            ScanOutcome::NotMarker => (None, None),
        }
    };

    let scan = LineScan {
        line: line.clone(),
        indent,
        blank,
        in_code,
        block_break,
        marker,
        ambiguity,
    };
    state.advance(&scan, config);
    scan
}

/// Scans every line. `states[i]` is the state before line `i`; the last
/// entry is the state after the final line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentScan {
    pub lines: Vec<LineScan>,
    pub states: Vec<ScanState>,
}

pub fn scan_lines(lines: &[LineRef], code_flags: &[bool], config: &ProcessingConfig) -> DocumentScan {
    let mut state = ScanState::default();
    let mut out = DocumentScan {
        lines: Vec::with_capacity(lines.len()),
        states: Vec::with_capacity(lines.len() + 1),
    };
    for (i, line) in lines.iter().enumerate() {
        out.states.push(state.clone());
        let in_code = code_flags.get(i).copied().unwrap_or(false);
        out.lines.push(scan_one(line, in_code, &mut state, config));
    }
    out.states.push(state);
    out
}
