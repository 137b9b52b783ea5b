use super::custom_label::normalize_label;

/// Prefix separating example ids from custom label ids in the registry.
pub const EXAMPLE_NAMESPACE: char = '@';

/// Registry id of an example label: `good` becomes `@good`.
pub fn example_id(label: &str) -> String {
    format!("{EXAMPLE_NAMESPACE}{}", normalize_label(label))
}
