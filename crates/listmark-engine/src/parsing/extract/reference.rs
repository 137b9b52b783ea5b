use super::{custom_label::normalize_label, example::{EXAMPLE_NAMESPACE, example_id}};

/// What an inline reference points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceTarget {
    /// `\ref{foo}`: a custom label, or failing that the example `@foo`.
    Label(String),
    /// `\ref{@foo}` or `(@foo)`.
    Example(String),
}

impl ReferenceTarget {
    /// From the text between the braces of `\ref{...}`.
    pub fn from_label_ref(inner: &str) -> Option<Self> {
        let id = normalize_label(inner);
        match id.strip_prefix(EXAMPLE_NAMESPACE) {
            Some(rest) if !rest.is_empty() => Some(Self::Example(rest.to_string())),
            Some(_) => None,
            None if id.is_empty() => None,
            None => Some(Self::Label(id)),
        }
    }

    /// From the label of an inline `(@label)`.
    pub fn from_example_ref(label: &str) -> Option<Self> {
        let id = normalize_label(label);
        (!id.is_empty()).then_some(Self::Example(id))
    }

    /// Registry ids to try, in order.
    pub fn candidates(&self) -> Vec<String> {
        match self {
            Self::Label(id) => vec![id.clone(), example_id(id)],
            Self::Example(label) => vec![example_id(label)],
        }
    }

    /// The id a broken reference is reported under.
    pub fn primary_id(&self) -> String {
        match self {
            Self::Label(id) => id.clone(),
            Self::Example(label) => example_id(label),
        }
    }
}
