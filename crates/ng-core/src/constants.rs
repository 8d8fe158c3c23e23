/// Declares an action to take.
pub const ACT: &str = "/act";

/// The purpose behind a message.
pub const INTENT: &str = "/intent";

/// Situational frame the message lives in. Sticky.
pub const CONTEXT: &str = "/context";

/// What the sender expects to receive back.
pub const DELIVERABLE: &str = "/deliverable";

/// Main topic under discussion. Sticky.
pub const FOCUS: &str = "/focus";

/// Speaker or participant list.
pub const MIND: &str = "/mind";

pub const QUERY: &str = "/query";
pub const RESOLVE: &str = "/resolve";
pub const ECHO: &str = "/echo";
pub const TIMELINE: &str = "/timeline";
pub const CHANNEL: &str = "/channel";
pub const NORM: &str = "/norm";
pub const GOVERN: &str = "/govern";

/// Keys folded into the active context when no override is configured.
pub const DEFAULT_STICKY_KEYS: [&str; 2] = [CONTEXT, FOCUS];

/// Tokens that ask for something back and so should name a deliverable.
pub const INTERACTIVE_TOKENS: [&str; 3] = [ACT, QUERY, RESOLVE];

/// Framing tokens skipped when reducing a message to its spoken content.
pub const META_TOKENS: [&str; 8] = [
    MIND,
    CONTEXT,
    INTENT,
    DELIVERABLE,
    TIMELINE,
    CHANNEL,
    NORM,
    GOVERN,
];

/// Number of trailing messages quoted back to a model when priming a reply.
pub const DEFAULT_HISTORY_WINDOW: usize = 3;

/// Agent name used for synthesized initialization messages.
pub const SYSTEM_AGENT: &str = "system";
