//! The label/reference registry shared by processors and the renderer.
//!
//! Maps normalized label ids to the sites that define them. An id may be
//! defined more than once; the last site in document order is active and
//! every other site produces one duplicate warning. Example labels live in
//! their own `@` namespace so `(@a)` and `(a)` never collide.

use std::collections::BTreeMap;

use crate::{
    error::{Diagnostic, ProcessError},
    parsing::{
        extract::{ReferenceTarget, example_id, normalize_label},
        rope::span::Span,
        types::{ListItemRecord, MarkerKind},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Custom,
    Example,
}

/// One place a label is defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DefinitionSite {
    /// Span of the defining marker.
    pub span: Span,
    /// What references to this label display, e.g. `(foo)` or `(3)`.
    pub display: String,
    pub kind: LabelKind,
    /// The defining block has not been redecorated since its label changed.
    pub stale: bool,
}

impl DefinitionSite {
    pub fn position(&self) -> usize {
        self.span.start
    }
}

/// A resolved (or not) inline reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceRecord {
    pub raw: String,
    pub target: ReferenceTarget,
    pub resolved_id: Option<String>,
    pub display: Option<String>,
    pub stale: bool,
}

impl ReferenceRecord {
    pub fn is_resolved(&self) -> bool {
        self.resolved_id.is_some()
    }

    /// Anchor id in rendered output.
    pub fn anchor(&self) -> Option<String> {
        self.resolved_id.as_deref().map(anchor_for)
    }
}

/// `@good` → `example-good`, `foo bar` → `label-foo-bar`.
pub fn anchor_for(id: &str) -> String {
    match id.strip_prefix('@') {
        Some(rest) => format!("example-{}", rest.replace(' ', "-")),
        None => format!("label-{}", id.replace(' ', "-")),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelRegistry {
    entries: BTreeMap<String, Vec<DefinitionSite>>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from analysed items, in document order.
    pub fn from_records(records: &[ListItemRecord]) -> Self {
        let mut registry = Self::new();
        for record in records {
            if let Some((id, site)) = definition_of(record) {
                registry.register(&id, site);
            }
        }
        registry
    }

    /// Adds a definition site. Sites stay sorted by position; registering
    /// the same span twice replaces the earlier entry.
    pub fn register(&mut self, id: &str, site: DefinitionSite) {
        let sites = self.entries.entry(id.to_string()).or_default();
        sites.retain(|s| s.span != site.span);
        let at = sites.partition_point(|s| s.position() <= site.position());
        sites.insert(at, site);
    }

    /// The active (last) definition of `id`.
    pub fn active(&self, id: &str) -> Option<&DefinitionSite> {
        self.entries.get(id).and_then(|sites| sites.last())
    }

    pub fn display(&self, id: &str) -> Option<&str> {
        self.active(id).map(|s| s.display.as_str())
    }

    pub fn sites(&self, id: &str) -> &[DefinitionSite] {
        self.entries.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One warning per site beyond the first of each id, anchored at the
    /// extra site.
    pub fn duplicate_diagnostics(&self) -> Vec<Diagnostic> {
        let mut out: Vec<Diagnostic> = self
            .entries
            .iter()
            .flat_map(|(id, sites)| {
                let first = sites.first().map_or(0, DefinitionSite::position);
                sites.iter().skip(1).map(move |s| {
                    Diagnostic::new(
                        s.span,
                        ProcessError::DuplicateLabelDefinition {
                            id: id.clone(),
                            first,
                        },
                    )
                })
            })
            .collect();
        out.sort_by_key(|d| d.span.start);
        out
    }

    /// Spans of every non-first site, i.e. the ones that get a duplicate mark.
    pub fn duplicate_spans(&self) -> Vec<Span> {
        self.entries
            .values()
            .flat_map(|sites| sites.iter().skip(1).map(|s| s.span))
            .collect()
    }

    /// Resolves a reference written as `raw`.
    pub fn resolve(&self, raw: &str, target: &ReferenceTarget) -> ReferenceRecord {
        for id in target.candidates() {
            if let Some(site) = self.active(&id) {
                return ReferenceRecord {
                    raw: raw.to_string(),
                    target: target.clone(),
                    resolved_id: Some(id),
                    display: Some(site.display.clone()),
                    stale: site.stale,
                };
            }
        }
        ReferenceRecord {
            raw: raw.to_string(),
            target: target.clone(),
            resolved_id: None,
            display: None,
            stale: false,
        }
    }
}

/// The registry id and site an item defines, if any.
pub fn definition_of(record: &ListItemRecord) -> Option<(String, DefinitionSite)> {
    let (id, kind) = match record.token.kind {
        MarkerKind::CustomLabel => (normalize_label(&record.label.text), LabelKind::Custom),
        MarkerKind::Example => (example_id(record.token.label.as_deref()?), LabelKind::Example),
        _ => return None,
    };
    if id.is_empty() {
        return None;
    }
    Some((
        id,
        DefinitionSite {
            span: record.token.span(),
            display: record.label.display.clone(),
            kind,
            stale: false,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parsing::analysis::analyze_text, settings::ProcessingConfig};
    use pretty_assertions::assert_eq;

    fn site(start: usize, display: &str) -> DefinitionSite {
        DefinitionSite {
            span: Span::new(start, start + 5),
            display: display.to_string(),
            kind: LabelKind::Custom,
            stale: false,
        }
    }

    fn registry(text: &str) -> LabelRegistry {
        LabelRegistry::from_records(&analyze_text(text, &ProcessingConfig::default()).records)
    }

    #[test]
    fn custom_and_example_labels_register() {
        let r = registry("(foo) First\n\n(@good) An example\n");
        assert_eq!(r.display("foo"), Some("(foo)"));
        assert_eq!(r.display("@good"), Some("(1)"));
        assert_eq!(r.display("good"), None);
    }

    #[test]
    fn unlabeled_examples_define_nothing() {
        assert!(registry("(@) one\n(@) two\n").is_empty());
    }

    #[test]
    fn last_definition_wins_and_each_duplicate_warns_once() {
        let mut r = LabelRegistry::new();
        r.register("foo", site(0, "first"));
        r.register("foo", site(20, "second"));
        r.register("foo", site(40, "third"));
        assert_eq!(r.display("foo"), Some("third"));
        let warnings = r.duplicate_diagnostics();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].span.start, 20);
        assert!(matches!(
            &warnings[1].error,
            ProcessError::DuplicateLabelDefinition { first: 0, .. }
        ));
    }

    #[test]
    fn registration_order_does_not_matter() {
        let mut a = LabelRegistry::new();
        a.register("x", site(0, "a"));
        a.register("x", site(10, "b"));
        let mut b = LabelRegistry::new();
        b.register("x", site(10, "b"));
        b.register("x", site(0, "a"));
        assert_eq!(a, b);
    }

    #[test]
    fn reregistering_a_site_replaces_it() {
        let mut r = LabelRegistry::new();
        r.register("x", site(0, "a"));
        r.register("x", site(0, "b"));
        assert_eq!(r.sites("x").len(), 1);
        assert_eq!(r.display("x"), Some("b"));
        assert!(r.duplicate_diagnostics().is_empty());
    }

    #[test]
    fn label_refs_fall_back_to_examples() {
        let r = registry("(@good) An example\n");
        let target = ReferenceTarget::from_label_ref("good").unwrap();
        let rec = r.resolve("\\ref{good}", &target);
        assert_eq!(rec.resolved_id.as_deref(), Some("@good"));
        assert_eq!(rec.anchor().as_deref(), Some("example-good"));
    }

    #[test]
    fn unresolved_reference_has_no_display() {
        let r = LabelRegistry::new();
        let target = ReferenceTarget::from_label_ref("nope").unwrap();
        let rec = r.resolve("\\ref{nope}", &target);
        assert!(!rec.is_resolved());
        assert_eq!(rec.display, None);
    }
}
