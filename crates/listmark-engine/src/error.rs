//! Error and diagnostic types.
//!
//! Nothing the core meets while processing a document is fatal to the host:
//! scan, numbering, label and reference problems become [`Diagnostic`]s and a
//! visible artifact in the output. Only the pipeline's commit step returns an
//! error, when a pass was computed for a document revision that no longer
//! exists.

use thiserror::Error;

use crate::parsing::rope::span::Span;

/// A non-fatal problem found while processing a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum ProcessError {
    #[error("`{text}` could be a list marker but is treated as text: {reason}")]
    ScanAmbiguous { text: String, reason: &'static str },

    #[error("label `{id}` is defined more than once (first definition at byte {first})")]
    DuplicateLabelDefinition { id: String, first: usize },

    #[error("reference `{raw}` does not match any label")]
    UnresolvedReference { raw: String },

    #[error("list marker `{raw}` has an unusable number; numbering continues automatically")]
    MalformedManualNumber { raw: String },

    #[error("could not renumber list item: {reason}")]
    CascadeRenumberFailure { reason: String },

    #[error("{processor} processor failed: {message}")]
    ProcessorFailed {
        processor: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A [`ProcessError`] anchored to the text it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub span: Span,
    pub severity: Severity,
    pub error: ProcessError,
}

impl Diagnostic {
    pub fn new(span: Span, error: ProcessError) -> Self {
        let severity = match &error {
            ProcessError::ScanAmbiguous { .. } => Severity::Info,
            ProcessError::ProcessorFailed { .. } => Severity::Error,
            _ => Severity::Warning,
        };
        Self {
            span,
            severity,
            error,
        }
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn shifted(&self, delta: isize) -> Diagnostic {
        Diagnostic {
            span: self.span.shifted(delta),
            ..self.clone()
        }
    }
}

/// Errors the live pipeline reports back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("pass computed for revision {pass} but the document is at revision {current}")]
    StaleRevision { pass: u64, current: u64 },
}

/// Invalid user settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("custom label pattern `{pattern}` must contain `{{label}}` exactly once")]
    MissingLabelPlaceholder { pattern: String },

    #[error("custom label pattern `{pattern}` has no delimiter around `{{label}}`")]
    BareLabelPattern { pattern: String },

    #[error("custom label pattern `{pattern}` could not be compiled: {source}")]
    InvalidLabelPattern {
        pattern: String,
        source: regex::Error,
    },
}
