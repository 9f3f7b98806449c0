//! Platform error classification.
//!
//! Hosting web views report load failures as `(domain, code, message)`
//! triples. Two of them are self-inflicted: the cancellation that follows
//! an intercepted navigation, and in-flight cancellations caused by rapid
//! interaction. Those are ignorable; everything else fails the flow.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error domain reported by WebKit-based views.
pub const WEBKIT_ERROR_DOMAIN: &str = "WebKitErrorDomain";
/// "Frame load interrupted": the view declined a navigation it was told to skip.
pub const WEBKIT_FRAME_LOAD_INTERRUPTED_BY_POLICY: i64 = 102;
/// Error domain of the platform URL loading system.
pub const URL_ERROR_DOMAIN: &str = "NSURLErrorDomain";
/// In-flight request cancelled.
pub const URL_ERROR_CANCELLED: i64 = -999;

/// Error reported by the hosting view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformError {
    pub domain: String,
    pub code: i64,
    /// Human-readable, platform-localized description.
    pub message: String,
}

impl PlatformError {
    pub fn new(domain: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of classifying a [`PlatformError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "classification", content = "reason", rename_all = "snake_case")]
pub enum ErrorClassification {
    Ignorable,
    Fatal(String),
}

impl ErrorClassification {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// A `(domain, code)` pair that is swallowed instead of failing the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRule {
    pub domain: String,
    pub code: i64,
}

impl IgnoreRule {
    pub fn new(domain: impl Into<String>, code: i64) -> Self {
        Self {
            domain: domain.into(),
            code,
        }
    }

    fn applies(&self, error: &PlatformError) -> bool {
        self.domain == error.domain && self.code == error.code
    }
}

/// Built-in ignorable errors.
pub fn default_ignore_rules() -> Vec<IgnoreRule> {
    vec![
        IgnoreRule::new(WEBKIT_ERROR_DOMAIN, WEBKIT_FRAME_LOAD_INTERRUPTED_BY_POLICY),
        IgnoreRule::new(URL_ERROR_DOMAIN, URL_ERROR_CANCELLED),
    ]
}

/// Maps platform errors to [`ErrorClassification`].
///
/// Domains outside the rule table are always fatal, including domains the
/// host may consider informational.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    rules: Vec<IgnoreRule>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorClassifier {
    pub fn new() -> Self {
        Self {
            rules: default_ignore_rules(),
        }
    }

    /// Classifier with no ignorable errors at all.
    pub fn strict() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: IgnoreRule) -> Self {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
        self
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn classify(&self, error: &PlatformError) -> ErrorClassification {
        if self.rules.iter().any(|rule| rule.applies(error)) {
            ErrorClassification::Ignorable
        } else {
            ErrorClassification::Fatal(error.message.clone())
        }
    }
}
