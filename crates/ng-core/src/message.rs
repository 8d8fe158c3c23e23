use std::fmt;

use serde::{Deserialize, Serialize};

use crate::formatter;
use crate::registry::Registry;
use crate::time::now_iso8601;
use crate::tokenizer::{self, TokenMap};
use crate::validator::{Diagnostic, Validation, Validator};

/// Who produced a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Human,
    #[serde(alias = "gpt")]
    ModelA,
    #[serde(alias = "claude")]
    ModelB,
}

impl AgentKind {
    pub fn is_model(&self) -> bool {
        !matches!(self, AgentKind::Human)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Human => "human",
            AgentKind::ModelA => "model_a",
            AgentKind::ModelB => "model_b",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn in a conversation. Field order is the export order.
///
/// `is_valid` is false exactly when validation raised an error-level
/// diagnostic; warnings appear in `validation_errors` without affecting it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub timestamp: String,
    pub agent: String,
    #[serde(alias = "agent_type")]
    pub agent_kind: AgentKind,
    pub tokens: TokenMap,
    pub raw_text: String,
    pub is_valid: bool,
    #[serde(default)]
    pub validation_errors: Vec<String>,
}

impl Message {
    pub fn token(&self, canonical: &str) -> Option<&str> {
        self.tokens.get(canonical).map(String::as_str)
    }

    pub fn declares(&self, canonical: &str) -> bool {
        self.tokens.contains_key(canonical)
    }

    /// Re-run validation to recover typed diagnostics for this message.
    pub fn diagnostics(&self, protocol: &Protocol) -> Vec<Diagnostic> {
        protocol.validate(&self.tokens).diagnostics
    }
}

/// Registry and validator held together; the entry point for building messages.
#[derive(Clone, Debug, Default)]
pub struct Protocol {
    registry: Registry,
    validator: Validator,
}

impl Protocol {
    pub fn new(registry: Registry, validator: Validator) -> Self {
        Self {
            registry,
            validator,
        }
    }

    /// Fixed NeuroGlyph table and rules.
    pub fn neuroglyph() -> Self {
        Self::new(Registry::neuroglyph(), Validator::neuroglyph())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn tokenize(&self, text: &str) -> TokenMap {
        tokenizer::tokenize_map(&self.registry, text)
    }

    pub fn validate(&self, tokens: &TokenMap) -> Validation {
        self.validator.validate(tokens)
    }

    pub fn format(&self, tokens: &TokenMap, prefer_symbol: bool) -> String {
        formatter::format(&self.registry, tokens, prefer_symbol)
    }

    /// Tokenize and validate raw text. Never fails; problems show up as
    /// `validation_errors`.
    pub fn parse(&self, text: &str, agent: &str, agent_kind: AgentKind) -> Message {
        let tokens = self.tokenize(text);
        let validation = self.validate(&tokens);
        Message {
            timestamp: now_iso8601(),
            agent: agent.to_string(),
            agent_kind,
            is_valid: validation.is_valid(),
            validation_errors: validation.messages(),
            tokens,
            raw_text: text.to_string(),
        }
    }

    /// Build a message from trusted tokens. Skips validation and is always
    /// valid; the raw text is the symbol-preferring rendering.
    pub fn synthesize(&self, tokens: TokenMap, agent: &str, agent_kind: AgentKind) -> Message {
        Message {
            timestamp: now_iso8601(),
            agent: agent.to_string(),
            agent_kind,
            raw_text: self.format(&tokens, true),
            tokens,
            is_valid: true,
            validation_errors: Vec::new(),
        }
    }
}
