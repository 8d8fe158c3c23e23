use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_STICKY_KEYS;
use crate::message::Message;

/// Latest value of each sticky key across a message history.
///
/// Only keys in the sticky set are ever stored. A key is absent until some
/// message declares it, and it is never cleared afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveContext {
    #[serde(skip, default = "default_sticky_keys")]
    sticky_keys: Vec<String>,
    #[serde(flatten)]
    values: IndexMap<String, String>,
}

fn default_sticky_keys() -> Vec<String> {
    DEFAULT_STICKY_KEYS.iter().map(|k| k.to_string()).collect()
}

impl ActiveContext {
    pub fn new() -> Self {
        Self::with_sticky_keys(DEFAULT_STICKY_KEYS)
    }

    pub fn with_sticky_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sticky_keys: keys.into_iter().map(Into::into).collect(),
            values: IndexMap::new(),
        }
    }

    pub fn sticky_keys(&self) -> &[String] {
        &self.sticky_keys
    }

    pub fn is_sticky(&self, key: &str) -> bool {
        self.sticky_keys.iter().any(|k| k == key)
    }

    /// Fold one message in: every sticky key it declares overwrites ours.
    pub fn apply(&mut self, message: &Message) {
        for key in &self.sticky_keys {
            if let Some(value) = message.tokens.get(key) {
                self.values.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace the sticky set, dropping stored values no longer covered.
    pub fn restrict_to<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sticky_keys = keys.into_iter().map(Into::into).collect();
        let sticky = &self.sticky_keys;
        self.values.retain(|k, _| sticky.contains(k));
    }
}

impl Default for ActiveContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure form of [`ActiveContext::apply`].
pub fn accumulate(active: &ActiveContext, message: &Message) -> ActiveContext {
    let mut next = active.clone();
    next.apply(message);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{AgentKind, Protocol};

    fn msg(text: &str) -> Message {
        Protocol::neuroglyph().parse(text, "Human", AgentKind::Human)
    }

    #[test]
    fn test_sticky_keys_overwrite() {
        let mut ctx = ActiveContext::new();
        ctx.apply(&msg("🎯: first\n📚: rust"));
        ctx.apply(&msg("🎯: second"));
        assert_eq!(ctx.get("/context"), Some("second"));
        assert_eq!(ctx.get("/focus"), Some("rust"));
    }

    #[test]
    fn test_non_sticky_ignored() {
        let mut ctx = ActiveContext::new();
        ctx.apply(&msg("🚀: go\n💡: why\n📦: it"));
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_absent_key_never_cleared() {
        let ctx = accumulate(&ActiveContext::new(), &msg("🎯: launch"));
        let ctx = accumulate(&ctx, &msg("no tokens at all"));
        assert_eq!(ctx.get("/context"), Some("launch"));
    }

    #[test]
    fn test_accumulate_leaves_input_untouched() {
        let before = ActiveContext::new();
        let after = accumulate(&before, &msg("📚: topic"));
        assert!(before.is_empty());
        assert_eq!(after.get("/focus"), Some("topic"));
    }

    #[test]
    fn test_replay_is_idempotent() {
        let m = msg("🎯: c\n📚: f");
        let once = accumulate(&ActiveContext::new(), &m);
        let twice = accumulate(&once, &m);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_sticky_set() {
        let mut ctx = ActiveContext::with_sticky_keys(["/mind", "/focus"]);
        ctx.apply(&msg("🧠: Ada, Grace\n🎯: ignored\n📚: compilers"));
        assert_eq!(ctx.get("/mind"), Some("Ada, Grace"));
        assert_eq!(ctx.get("/context"), None);

        ctx.restrict_to(["/focus"]);
        assert_eq!(ctx.get("/mind"), None);
        assert_eq!(ctx.get("/focus"), Some("compilers"));
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let ctx = accumulate(&ActiveContext::new(), &msg("📚: f\n🎯: c"));
        let json = serde_json::to_string(&ctx).unwrap();
        assert_eq!(json, r#"{"/context":"c","/focus":"f"}"#);
    }
}
