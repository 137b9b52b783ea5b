//! User settings and their compiled, pass-immutable form.
//!
//! [`Settings`] is the serde-facing shape owned by the settings component (see
//! the `listmark-config` crate). The core never reads it directly during a
//! pass; it reads a [`ProcessingConfig`] compiled once from it. Changing
//! settings means compiling a new config and rescanning everything.

use std::collections::BTreeSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    error::SettingsError,
    parsing::{patterns, types::MarkerKind},
};

/// Whether prose between list items ends the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuationPolicy {
    /// Unindented prose closes every open list; the next item starts over.
    #[default]
    Strict,
    /// Unindented prose suspends open lists; an item of the same family
    /// afterwards continues the numbering.
    Loose,
}

/// Display templates. `{n}` is replaced by the item number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberingStyles {
    pub example: String,
    pub hash: String,
    pub bullet: String,
}

impl Default for NumberingStyles {
    fn default() -> Self {
        Self {
            example: "({n})".to_string(),
            hash: "{n}.".to_string(),
            bullet: "•".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineSettings {
    pub superscript: bool,
    pub subscript: bool,
}

impl Default for InlineSettings {
    fn default() -> Self {
        Self {
            superscript: true,
            subscript: true,
        }
    }
}

/// Live preview tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveSettings {
    /// Lines above and below the viewport that are decorated eagerly.
    pub viewport_margin: usize,
    /// How many ranges past an edit are redecorated eagerly when a
    /// renumbering cascade reaches them. Ranges beyond it stay stale until
    /// they come into view.
    pub cascade_window: usize,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            viewport_margin: 20,
            cascade_window: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub continuation_policy: ContinuationPolicy,
    /// Minimum extra indentation (in columns) for prose to continue a list
    /// item after a blank line.
    pub continuation_indent: usize,
    pub enabled_marker_kinds: BTreeSet<MarkerKind>,
    /// Template for custom label markers; must contain `{label}` once.
    pub custom_label_pattern: String,
    pub numbering: NumberingStyles,
    /// Treat every written number as a manual restart, not only the first.
    pub honor_literal_numbers: bool,
    /// Require two spaces after `B.` style markers.
    pub strict_capital_letters: bool,
    pub inline: InlineSettings,
    pub live: LiveSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            continuation_policy: ContinuationPolicy::Strict,
            continuation_indent: 2,
            enabled_marker_kinds: MarkerKind::ALL.into_iter().collect(),
            custom_label_pattern: "({label})".to_string(),
            numbering: NumberingStyles::default(),
            honor_literal_numbers: false,
            strict_capital_letters: true,
            inline: InlineSettings::default(),
            live: LiveSettings::default(),
        }
    }
}

impl Settings {
    /// Validates the settings and compiles the custom label template.
    pub fn compile(&self) -> Result<ProcessingConfig, SettingsError> {
        let custom_label = CustomLabelPattern::compile(&self.custom_label_pattern)?;
        Ok(ProcessingConfig {
            settings: self.clone(),
            custom_label,
        })
    }
}

/// The custom label template split around `{label}`, plus the line regex
/// built from it.
#[derive(Debug, Clone)]
pub struct CustomLabelPattern {
    pub prefix: String,
    pub suffix: String,
    line: Regex,
}

impl CustomLabelPattern {
    pub const PLACEHOLDER: &'static str = "{label}";

    pub fn compile(template: &str) -> Result<Self, SettingsError> {
        if template.matches(Self::PLACEHOLDER).count() != 1 {
            return Err(SettingsError::MissingLabelPlaceholder {
                pattern: template.to_string(),
            });
        }
        let (prefix, suffix) = template
            .split_once(Self::PLACEHOLDER)
            .ok_or_else(|| SettingsError::MissingLabelPlaceholder {
                pattern: template.to_string(),
            })?;
        if prefix.trim().is_empty() || suffix.trim().is_empty() {
            return Err(SettingsError::BareLabelPattern {
                pattern: template.to_string(),
            });
        }

        let source = format!(
            r"^(?P<indent>[ \t]*)(?P<marker>{}(?P<label>{}){})(?P<ws>[ \t]+|$)",
            regex::escape(prefix),
            patterns::CUSTOM_LABEL_BODY,
            regex::escape(suffix),
        );
        let line = Regex::new(&source).map_err(|source| SettingsError::InvalidLabelPattern {
            pattern: template.to_string(),
            source,
        })?;

        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            line,
        })
    }

    /// Regex matching a custom label marker at the start of a line.
    pub fn line_regex(&self) -> &Regex {
        &self.line
    }

    /// Wraps an expanded label in the template delimiters.
    pub fn display(&self, label: &str) -> String {
        format!("{}{}{}", self.prefix, label, self.suffix)
    }
}

/// Settings compiled for one processing pass. Cheap to clone, never mutated.
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    settings: Settings,
    custom_label: CustomLabelPattern,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            custom_label: patterns::DEFAULT_CUSTOM_LABEL.clone(),
        }
    }
}

impl ProcessingConfig {
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn custom_label(&self) -> &CustomLabelPattern {
        &self.custom_label
    }

    pub fn is_enabled(&self, kind: MarkerKind) -> bool {
        self.settings.enabled_marker_kinds.contains(&kind)
    }

    pub fn format_example(&self, n: u32) -> String {
        self.settings.numbering.example.replace("{n}", &n.to_string())
    }

    pub fn format_hash(&self, n: u32) -> String {
        self.settings.numbering.hash.replace("{n}", &n.to_string())
    }

    pub fn bullet(&self) -> &str {
        &self.settings.numbering.bullet
    }
}
