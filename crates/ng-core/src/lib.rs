//! NeuroGlyph protocol engine.
//!
//! A NeuroGlyph message is a sequence of segments, each a token (a registered
//! pictographic symbol or a `/word` identifier), a colon, and a free-text
//! value that may span lines. The engine tokenizes text into an ordered
//! canonical token map, validates it against the protocol rules, renders maps
//! back to text, and folds sticky keys of successive messages into an active
//! context.
//!
//! Zero I/O: no model calls, no files, no blocking. Front ends supply replies
//! through [`ReplyAgent`] and persist conversations via [`export_json`].

pub mod agent;
pub mod constants;
pub mod context;
pub mod conversation;
pub mod export;
pub mod formatter;
pub mod message;
pub mod registry;
pub mod time;
pub mod tokenizer;
pub mod validator;

pub use agent::{ReplyAgent, ReplyError, ScriptedAgent};
pub use constants::{DEFAULT_HISTORY_WINDOW, DEFAULT_STICKY_KEYS, SYSTEM_AGENT};
pub use context::{ActiveContext, accumulate};
pub use conversation::{Conversation, ConversationStats, TurnError, wants_auto_reply};
pub use export::{ConversationExport, export_json, export_text, import_json, spoken_text};
pub use formatter::format;
pub use message::{AgentKind, Message, Protocol};
pub use registry::{Collision, Registry};
pub use time::{
    now_iso8601, now_stamp, unix_micros_to_iso8601, unix_to_iso8601, unix_to_stamp,
};
pub use tokenizer::{TokenMap, tokenize, tokenize_map};
pub use validator::{Diagnostic, Rule, Severity, Validation, Validator};
