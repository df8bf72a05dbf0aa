//! Element locators shared by site definitions and page actions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A CSS selector, optionally narrowed to elements whose visible text
/// contains `text` (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub css: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Locator {
    pub fn css(css: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            text: None,
        }
    }

    pub fn with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            text: Some(text.into()),
        }
    }

    /// Whether `candidate` satisfies the text filter.
    pub fn matches_text(&self, candidate: &str) -> bool {
        match &self.text {
            Some(needle) => candidate.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{} containing {:?}", self.css, text),
            None => f.write_str(&self.css),
        }
    }
}

/// Render a locator list for log fields.
pub fn describe(locators: &[Locator]) -> String {
    locators
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}
