use std::collections::HashMap;

use crate::parsing::patterns::LABEL_PLACEHOLDER;

/// Registry key for a label: trimmed, inner whitespace runs collapsed to one
/// space. Case is kept.
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Document-wide numbering of `(#name)` placeholders. The first use of a
/// name takes the next number; later uses reuse it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderTable {
    assigned: HashMap<String, u32>,
    next: u32,
}

impl PlaceholderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every placeholder in `raw` with its number.
    pub fn expand(&mut self, raw: &str) -> String {
        if !raw.contains("(#") {
            return raw.to_string();
        }
        LABEL_PLACEHOLDER
            .replace_all(raw, |caps: &regex::Captures<'_>| {
                let name = caps.name("name").map_or("", |m| m.as_str());
                self.number_for(name).to_string()
            })
            .into_owned()
    }

    pub fn number_for(&mut self, name: &str) -> u32 {
        if let Some(n) = self.assigned.get(name) {
            return *n;
        }
        self.next += 1;
        self.assigned.insert(name.to_string(), self.next);
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalization_trims_and_collapses() {
        assert_eq!(normalize_label("  my   label "), "my label");
        assert_eq!(normalize_label("Foo"), "Foo");
    }

    #[test]
    fn placeholders_number_in_first_use_order() {
        let mut table = PlaceholderTable::new();
        assert_eq!(table.expand("P(#a)"), "P1");
        assert_eq!(table.expand("P(#b)"), "P2");
        assert_eq!(table.expand("Q(#a)"), "Q1");
        assert_eq!(table.expand("plain"), "plain");
    }

    #[test]
    fn several_placeholders_in_one_label() {
        let mut table = PlaceholderTable::new();
        assert_eq!(table.expand("(#x)-(#y)-(#x)"), "1-2-1");
    }
}
