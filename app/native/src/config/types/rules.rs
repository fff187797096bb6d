//! Window rule configuration types.
//!
//! Rules decide whether a newly shown window is managed, and whether it starts
//! tiled or floating. The first rule whose criteria all match wins.

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Strategy for matching a window property against a pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum MatchStrategy {
    /// Exact match (case-insensitive). This is the default strategy.
    #[default]
    Exact,
    /// Property contains the specified string (case-insensitive).
    Contains,
    /// Property starts with the specified string (case-insensitive).
    StartsWith,
    /// Property matches the specified regex pattern.
    Regex,
}

/// A single property pattern.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchPattern {
    /// The string or regex to match.
    pub value: String,

    /// How `value` is compared.
    pub strategy: MatchStrategy,

    #[serde(skip)]
    #[schemars(skip)]
    value_lower: String,

    #[serde(skip)]
    #[schemars(skip)]
    compiled: Option<Regex>,
}

impl MatchPattern {
    /// Creates a pattern and prepares it for matching.
    #[must_use]
    pub fn new(value: impl Into<String>, strategy: MatchStrategy) -> Self {
        let mut pattern = Self {
            value: value.into(),
            strategy,
            ..Default::default()
        };
        pattern.prepare();
        pattern
    }

    /// Pre-computes the lowercase value and compiles the regex, if any.
    ///
    /// An invalid regex is logged once here and never matches.
    pub fn prepare(&mut self) {
        self.value_lower = self.value.to_lowercase();
        self.compiled = match self.strategy {
            MatchStrategy::Regex => match Regex::new(&self.value) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    tracing::warn!(pattern = %self.value, error = %err, "invalid window rule regex");
                    None
                }
            },
            _ => None,
        };
    }

    /// Returns `true` if `candidate` matches this pattern.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        let needle = if self.value_lower.is_empty() && !self.value.is_empty() {
            self.value.to_lowercase()
        } else {
            self.value_lower.clone()
        };

        match self.strategy {
            MatchStrategy::Exact => candidate.to_lowercase() == needle,
            MatchStrategy::Contains => candidate.to_lowercase().contains(&needle),
            MatchStrategy::StartsWith => candidate.to_lowercase().starts_with(&needle),
            MatchStrategy::Regex => self.compiled.as_ref().map_or_else(
                || Regex::new(&self.value).is_ok_and(|regex| regex.is_match(candidate)),
                |regex| regex.is_match(candidate),
            ),
        }
    }
}

/// What to do with a window matched by a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RuleAction {
    /// Manage the window as a tiling window.
    #[default]
    Tiling,
    /// Manage the window as a floating window.
    Floating,
    /// Never manage the window.
    Ignore,
}

/// The window properties a rule is matched against.
#[derive(Debug, Clone, Copy)]
pub struct RuleSubject<'a> {
    /// Executable name of the owning process.
    pub process_name: &'a str,
    /// Native window class.
    pub class_name: &'a str,
    /// Current window title.
    pub title: &'a str,
}

/// Window matching rule.
///
/// All specified properties must match (AND logic).
/// At least one property must be specified.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowRule {
    /// Match by process name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_name: Option<MatchPattern>,

    /// Match by window class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<MatchPattern>,

    /// Match by window title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<MatchPattern>,

    /// Action applied to matching windows.
    pub action: RuleAction,
}

impl WindowRule {
    /// Returns true if the rule has at least one matching criterion.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.process_name.is_some() || self.class_name.is_some() || self.title.is_some()
    }

    /// Prepares every pattern of the rule for matching.
    pub fn prepare(&mut self) {
        for pattern in [&mut self.process_name, &mut self.class_name, &mut self.title]
            .into_iter()
            .flatten()
        {
            pattern.prepare();
        }
    }

    /// Returns `true` if every specified criterion matches the subject.
    #[must_use]
    pub fn matches(&self, subject: &RuleSubject<'_>) -> bool {
        if !self.is_valid() {
            return false;
        }

        let check = |pattern: &Option<MatchPattern>, value: &str| {
            pattern.as_ref().is_none_or(|p| p.matches(value))
        };

        check(&self.process_name, subject.process_name)
            && check(&self.class_name, subject.class_name)
            && check(&self.title, subject.title)
    }
}
