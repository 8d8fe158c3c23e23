//! Structural rules over a token map.
//!
//! Rules are data: an ordered list of `(violated, severity, message)` entries.
//! Diagnostic order follows rule order.

use serde::{Deserialize, Serialize};

use crate::constants::{ACT, CONTEXT, DELIVERABLE, INTENT, INTERACTIVE_TOKENS};
use crate::tokenizer::TokenMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// A single protocol rule.
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    pub name: &'static str,
    pub severity: Severity,
    pub violated: fn(&TokenMap) -> bool,
    pub message: fn(&TokenMap) -> String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validation {
    pub diagnostics: Vec<Diagnostic>,
}

impl Validation {
    /// True when no error-level diagnostic was raised. Warnings don't count.
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// Messages in rule order, as stored on a [`crate::Message`].
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.message.clone()).collect()
    }
}

#[derive(Clone, Debug)]
pub struct Validator {
    rules: Vec<Rule>,
}

impl Validator {
    /// Validator with no rules: every map is valid.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The protocol's standard rule set.
    pub fn neuroglyph() -> Self {
        Self {
            rules: vec![
                Rule {
                    name: "act-requires-intent",
                    severity: Severity::Error,
                    violated: |t| t.contains_key(ACT) && !t.contains_key(INTENT),
                    message: |_| format!("Action requires {INTENT} declaration"),
                },
                Rule {
                    name: "act-requires-context",
                    severity: Severity::Error,
                    violated: |t| t.contains_key(ACT) && !t.contains_key(CONTEXT),
                    message: |_| format!("Action requires {CONTEXT} declaration"),
                },
                Rule {
                    name: "interactive-expects-deliverable",
                    severity: Severity::Warning,
                    violated: |t| {
                        INTERACTIVE_TOKENS.iter().any(|k| t.contains_key(*k))
                            && !t.contains_key(DELIVERABLE)
                    },
                    message: |_| {
                        format!("Interactive tokens should specify expected {DELIVERABLE}")
                    },
                },
            ],
        }
    }

    /// Append a rule after the existing ones.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn validate(&self, tokens: &TokenMap) -> Validation {
        let diagnostics = self
            .rules
            .iter()
            .filter(|rule| (rule.violated)(tokens))
            .map(|rule| Diagnostic {
                severity: rule.severity,
                message: (rule.message)(tokens),
            })
            .collect();
        Validation { diagnostics }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::neuroglyph()
    }
}
