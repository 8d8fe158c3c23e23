use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::agent::{ReplyAgent, ReplyError};
use crate::constants::{
    CHANNEL, CONTEXT, DEFAULT_HISTORY_WINDOW, DELIVERABLE, ECHO, FOCUS, GOVERN, INTENT, MIND,
    NORM, QUERY, SYSTEM_AGENT, TIMELINE,
};
use crate::context::ActiveContext;
use crate::message::{AgentKind, Message, Protocol};
use crate::time::now_stamp;
use crate::tokenizer::TokenMap;

#[derive(Debug)]
pub enum TurnError {
    /// A model turn was requested for a non-model agent kind.
    NotAModel(AgentKind),
    /// The reply producer failed. Nothing was appended.
    Reply { agent: String, source: ReplyError },
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnError::NotAModel(kind) => {
                write!(f, "invalid agent kind for a model turn: {kind}")
            }
            TurnError::Reply { agent, source } => write!(f, "{agent} failed to reply: {source}"),
        }
    }
}

impl std::error::Error for TurnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TurnError::NotAModel(_) => None,
            TurnError::Reply { source, .. } => Some(source.as_ref()),
        }
    }
}

/// Message counts by agent kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversationStats {
    pub total: usize,
    pub human: usize,
    pub model_a: usize,
    pub model_b: usize,
    /// Messages that failed validation.
    pub invalid: usize,
}

impl ConversationStats {
    pub fn models(&self) -> usize {
        self.model_a + self.model_b
    }
}

/// Ordered message history plus the active context folded from it.
///
/// Every append goes through [`Conversation::push`] so the fold stays in
/// history order. Hosts sharing one conversation must serialize mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub participants: Vec<String>,
    /// Trailing messages quoted in [`Conversation::prompt_context`] for a turn.
    pub history_window: usize,
    history: Vec<Message>,
    active_context: ActiveContext,
}

impl Conversation {
    pub fn new() -> Self {
        Self::with_context(ActiveContext::new())
    }

    /// Start empty with a caller-chosen sticky set.
    pub fn with_context(active_context: ActiveContext) -> Self {
        Self {
            id: next_conversation_id(),
            participants: Vec::new(),
            history_window: DEFAULT_HISTORY_WINDOW,
            history: Vec::new(),
            active_context,
        }
    }

    /// Rebuild from stored parts. The active context is taken as given.
    pub fn from_parts(id: String, active_context: ActiveContext, history: Vec<Message>) -> Self {
        let participants = history
            .iter()
            .find(|m| m.agent == SYSTEM_AGENT)
            .and_then(|m| m.token(MIND))
            .map(split_participants)
            .unwrap_or_default();
        Self {
            id,
            participants,
            history_window: DEFAULT_HISTORY_WINDOW,
            history,
            active_context,
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn active_context(&self) -> &ActiveContext {
        &self.active_context
    }

    pub fn active_context_mut(&mut self) -> &mut ActiveContext {
        &mut self.active_context
    }

    pub fn last(&self) -> Option<&Message> {
        self.history.last()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn stats(&self) -> ConversationStats {
        self.history
            .iter()
            .fold(ConversationStats::default(), |mut stats, msg| {
                stats.total += 1;
                match msg.agent_kind {
                    AgentKind::Human => stats.human += 1,
                    AgentKind::ModelA => stats.model_a += 1,
                    AgentKind::ModelB => stats.model_b += 1,
                }
                if !msg.is_valid {
                    stats.invalid += 1;
                }
                stats
            })
    }

    /// Append a message and fold it into the active context.
    pub fn push(&mut self, message: Message) -> &Message {
        self.active_context.apply(&message);
        self.history.push(message);
        &self.history[self.history.len() - 1]
    }

    /// Synthesize and append the system message that opens a conversation.
    pub fn initialize(
        &mut self,
        protocol: &Protocol,
        topic: &str,
        participants: &[String],
        context: Option<&str>,
        intent: Option<&str>,
    ) -> &Message {
        self.participants = participants.to_vec();
        let tokens = init_tokens(topic, participants, context, intent);
        let message = protocol.synthesize(tokens, SYSTEM_AGENT, AgentKind::Human);
        self.push(message)
    }

    /// Parse raw text from any agent and append it.
    pub fn add_message(
        &mut self,
        protocol: &Protocol,
        text: &str,
        agent: &str,
        agent_kind: AgentKind,
    ) -> &Message {
        let message = protocol.parse(text, agent, agent_kind);
        self.push(message)
    }

    /// Priming text handed to a model: current state, recent turns, and the
    /// expected reply format.
    pub fn prompt_context(&self, window: usize) -> String {
        let participants = if self.participants.is_empty() {
            "Unknown".to_string()
        } else {
            self.participants.join(", ")
        };

        let mut lines = vec![
            "You are participating in a NeuroGlyph conversation.".to_string(),
            "NeuroGlyph is a structured protocol for human-AI dialogue.".to_string(),
            format!(
                "Active context: {}",
                self.active_context.get(CONTEXT).unwrap_or("General dialogue")
            ),
            format!(
                "Current focus: {}",
                self.active_context.get(FOCUS).unwrap_or("Open discussion")
            ),
            format!("Participants: {participants}"),
            String::new(),
            "Recent conversation history:".to_string(),
        ];

        let start = self.history.len().saturating_sub(window);
        for msg in &self.history[start..] {
            lines.push(format!("[{}]: {}", msg.agent, msg.raw_text));
        }

        lines.extend(
            [
                "",
                "Please respond using NeuroGlyph protocol. Include appropriate tokens like:",
                "/mind: your_agent_name",
                "/focus: main_topic_or_concept",
                "/intent: your_purpose_in_responding",
                "/deliverable: what_you_aim_to_provide",
                "And your actual response content.",
                "",
                "Be conversational but maintain the structured format.",
            ]
            .map(String::from),
        );

        lines.join("\n")
    }

    /// Ask `agent` for a reply and append it as a message of `kind`.
    ///
    /// Fails without touching the history when `kind` is not a model kind or
    /// the agent errors.
    pub fn take_turn(
        &mut self,
        protocol: &Protocol,
        agent: &dyn ReplyAgent,
        kind: AgentKind,
        prompt: &str,
    ) -> Result<&Message, TurnError> {
        if !kind.is_model() {
            return Err(TurnError::NotAModel(kind));
        }
        let context = self.prompt_context(self.history_window);
        let reply = agent
            .produce_reply(prompt, &context)
            .map_err(|source| TurnError::Reply {
                agent: agent.name().to_string(),
                source,
            })?;
        Ok(self.add_message(protocol, &reply, agent.name(), kind))
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a message asks the models to answer without being prompted.
pub fn wants_auto_reply(message: &Message) -> bool {
    message.declares(ECHO) || message.declares(QUERY)
}

/// A UTC stamp, suffixed `_2`, `_3`, ... for further conversations created
/// in the same second by this process.
fn next_conversation_id() -> String {
    static LAST: Mutex<(String, u32)> = Mutex::new((String::new(), 0));
    let stamp = now_stamp();
    let mut last = LAST.lock().unwrap_or_else(PoisonError::into_inner);
    if last.0 == stamp {
        last.1 += 1;
        format!("{stamp}_{}", last.1)
    } else {
        *last = (stamp.clone(), 1);
        stamp
    }
}

fn split_participants(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn init_tokens(
    topic: &str,
    participants: &[String],
    context: Option<&str>,
    intent: Option<&str>,
) -> TokenMap {
    let context = context
        .filter(|c| !c.is_empty())
        .map(String::from)
        .unwrap_or_else(|| format!("Multi-agent dialogue on {topic}"));
    let intent = intent
        .filter(|i| !i.is_empty())
        .unwrap_or("Collaborative exploration and understanding");

    [
        (MIND, participants.join(", ")),
        (FOCUS, topic.to_string()),
        (CONTEXT, context),
        (INTENT, intent.to_string()),
        (DELIVERABLE, "structured_dialogue".to_string()),
        (TIMELINE, "ongoing".to_string()),
        (CHANNEL, "text_and_voice".to_string()),
        (NORM, "respectful_dialogue, ng_protocol_adherence".to_string()),
        (GOVERN, "consensus_seeking".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}
