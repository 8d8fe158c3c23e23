//! Conversation export formats.
//!
//! The JSON shape is the interchange contract between front ends:
//! `conversation_id`, `active_context`, then `messages` with a fixed field order.

use serde::{Deserialize, Serialize};

use crate::constants::{CONTEXT, DEFAULT_STICKY_KEYS, FOCUS, META_TOKENS};
use crate::context::ActiveContext;
use crate::conversation::Conversation;
use crate::message::Message;
use crate::registry::Registry;
use crate::tokenizer::segment_head;

#[derive(Serialize, Deserialize, Debug)]
pub struct ConversationExport {
    pub conversation_id: String,
    #[serde(default)]
    pub active_context: ActiveContext,
    pub messages: Vec<Message>,
}

impl ConversationExport {
    pub fn from_conversation(conversation: &Conversation) -> Self {
        Self {
            conversation_id: conversation.id.clone(),
            active_context: conversation.active_context().clone(),
            messages: conversation.history().to_vec(),
        }
    }

    /// Rebuild a conversation, keeping only the given sticky keys from the
    /// stored active context.
    pub fn into_conversation_with<I, S>(self, sticky_keys: I) -> Conversation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut active = self.active_context;
        active.restrict_to(sticky_keys);
        Conversation::from_parts(self.conversation_id, active, self.messages)
    }

    pub fn into_conversation(self) -> Conversation {
        self.into_conversation_with(DEFAULT_STICKY_KEYS)
    }
}

/// Serialize a conversation to pretty JSON. Non-ASCII symbols are written as-is.
pub fn export_json(conversation: &Conversation) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ConversationExport::from_conversation(conversation))
}

/// Deserialize a JSON export using the default sticky keys.
pub fn import_json(json: &str) -> Result<Conversation, serde_json::Error> {
    let export: ConversationExport = serde_json::from_str(json)?;
    Ok(export.into_conversation())
}

/// Plain-text transcript for reading or sharing.
pub fn export_text(conversation: &Conversation) -> String {
    let ctx = conversation.active_context();
    let title = "NeuroGlyph Conversation Export";
    let mut out = vec![
        title.to_string(),
        "=".repeat(title.len()),
        format!("Focus: {}", ctx.get(FOCUS).unwrap_or("Unknown")),
        format!("Context: {}", ctx.get(CONTEXT).unwrap_or("Unknown")),
        String::new(),
    ];
    for msg in conversation.history() {
        out.push(format!("[{} - {}]", msg.agent, msg.timestamp));
        out.push(msg.raw_text.clone());
        out.push(String::new());
    }
    out.join("\n")
}

/// Reduce message text to what is worth reading aloud: values of content
/// tokens and untokenized lines. Framing segments (`/mind`, `/context`, ...)
/// are dropped whole, in either notation.
pub fn spoken_text(registry: &Registry, raw_text: &str) -> String {
    let mut parts = Vec::new();
    let mut framing = false;
    for line in raw_text.lines() {
        let part = match segment_head(registry, line) {
            Some(len) => {
                framing = META_TOKENS.contains(&registry.resolve_to_canonical(&line[..len]));
                &line[len + 1..]
            }
            None => line,
        };
        let part = part.trim();
        if !framing && !part.is_empty() {
            parts.push(part);
        }
    }
    parts.join(" ")
}
