use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::narration::ClipDurations;

// Indices are written without leading zeros, so `#DURATION_01#` is not a placeholder
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#DURATION_(0|[1-9][0-9]*)#").expect("placeholder pattern is valid")
});

/// Authored scene script with `#DURATION_<i>#` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneTemplate {
    text: String,
}

impl SceneTemplate {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Placeholder token for clip `index`
    pub fn placeholder(index: usize) -> String {
        format!("#DURATION_{}#", index)
    }

    /// Clip indices referenced anywhere in the template
    pub fn placeholder_indices(&self) -> BTreeSet<usize> {
        PLACEHOLDER
            .captures_iter(&self.text)
            .filter_map(|caps| caps[1].parse().ok())
            .collect()
    }

    /// Replace every placeholder whose index has a duration.
    ///
    /// Placeholders without a duration are kept verbatim.
    pub fn resolve(&self, durations: &ClipDurations) -> String {
        PLACEHOLDER
            .replace_all(&self.text, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| durations.get(index))
                    .map(format_seconds)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

impl From<String> for SceneTemplate {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for SceneTemplate {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Shortest decimal that reads back as the same value (`2.5`, `3.75`)
pub fn format_seconds(seconds: f64) -> String {
    seconds.to_string()
}
