//! Capability interface for anything that can answer a turn.
//!
//! The engine never talks to a model directly. Front ends pick an
//! implementation per [`crate::AgentKind`] and hand it to
//! [`crate::Conversation::take_turn`].

use std::error::Error;

/// Failure reported by a reply producer. Opaque to the engine.
pub type ReplyError = Box<dyn Error + Send + Sync>;

pub trait ReplyAgent {
    /// Name recorded as the message's `agent`.
    fn name(&self) -> &str;

    /// Produce reply text for `prompt`, primed with `context`.
    fn produce_reply(&self, prompt: &str, context: &str) -> Result<String, ReplyError>;
}

/// Replies with a fixed script, one entry per call, then repeats the last.
/// Useful for tests and offline front ends.
#[derive(Clone, Debug)]
pub struct ScriptedAgent {
    name: String,
    replies: Vec<String>,
    cursor: std::cell::Cell<usize>,
}

impl ScriptedAgent {
    pub fn new(name: &str, replies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.to_string(),
            replies: replies.into_iter().map(Into::into).collect(),
            cursor: std::cell::Cell::new(0),
        }
    }
}

impl ReplyAgent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn produce_reply(&self, _prompt: &str, _context: &str) -> Result<String, ReplyError> {
        let i = self.cursor.get();
        let reply = self
            .replies
            .get(i)
            .or_else(|| self.replies.last())
            .ok_or("scripted agent has no replies")?;
        self.cursor.set(i + 1);
        Ok(reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_replies_then_repeats() {
        let agent = ScriptedAgent::new("bot", ["one", "two"]);
        assert_eq!(agent.produce_reply("", "").unwrap(), "one");
        assert_eq!(agent.produce_reply("", "").unwrap(), "two");
        assert_eq!(agent.produce_reply("", "").unwrap(), "two");
        assert_eq!(agent.name(), "bot");
    }

    #[test]
    fn test_empty_script_errors() {
        let agent = ScriptedAgent::new("bot", Vec::<String>::new());
        let err = agent.produce_reply("", "").unwrap_err();
        assert_eq!(err.to_string(), "scripted agent has no replies");
    }
}
