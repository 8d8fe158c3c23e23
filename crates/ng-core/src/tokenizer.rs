use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

use crate::registry::Registry;

static SLASH_HEAD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/[A-Za-z_]+:").unwrap());

/// Canonical identifier → value, in first-declaration order.
pub type TokenMap = IndexMap<String, String>;

/// Where a segment begins and where its value starts, as byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SegmentStart {
    line_start: usize,
    token_end: usize,
    value_start: usize,
}

/// Recognize a segment head (`<symbol>:` or `/word:`) at the start of `line`.
/// Returns the token length in bytes, excluding the colon.
///
/// Only the longest registered prefix is tried. No registered symbol contains
/// a colon, so a shorter prefix could never be followed by one either.
pub(crate) fn segment_head(registry: &Registry, line: &str) -> Option<usize> {
    if let Some(symbol) = registry.match_symbol_prefix(line)
        && line[symbol.len()..].starts_with(':')
    {
        return Some(symbol.len());
    }
    SLASH_HEAD.find(line).map(|m| m.end() - 1)
}

/// First pass: every line start that opens a segment.
fn find_segment_starts(registry: &Registry, text: &str) -> Vec<SegmentStart> {
    let line_starts =
        std::iter::once(0).chain(text.match_indices('\n').map(|(i, _)| i + 1));

    line_starts
        .filter(|&start| start < text.len())
        .filter_map(|start| {
            let token_len = segment_head(registry, &text[start..])?;
            Some(SegmentStart {
                line_start: start,
                token_end: start + token_len,
                value_start: start + token_len + 1,
            })
        })
        .collect()
}

/// Split text into raw `(token, value)` pairs in textual order.
///
/// A segment runs from its head to the next line that opens a segment, so
/// values may span lines. Text before the first head is dropped. Tokens are
/// returned as written; see [`tokenize_map`] for canonical keys. A leading
/// byte order mark is ignored.
pub fn tokenize(registry: &Registry, text: &str) -> Vec<(String, String)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let starts = find_segment_starts(registry, text);

    // Second pass: slice between consecutive starts.
    starts
        .iter()
        .enumerate()
        .map(|(i, start)| {
            let end = starts.get(i + 1).map_or(text.len(), |next| next.line_start);
            let token = &text[start.line_start..start.token_end];
            let value = text[start.value_start..end].trim();
            (token.to_string(), value.to_string())
        })
        .collect()
}

/// Tokenize and canonicalize into a [`TokenMap`].
/// A repeated key keeps its first position and takes the last value.
pub fn tokenize_map(registry: &Registry, text: &str) -> TokenMap {
    let mut tokens = TokenMap::new();
    for (raw, value) in tokenize(registry, text) {
        let canonical = registry.resolve_to_canonical(&raw).to_string();
        tokens.insert(canonical, value);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg() -> Registry {
        Registry::neuroglyph()
    }

    #[test]
    fn test_symbol_segments() {
        let pairs = tokenize(&reg(), "🚀: ship_v1\n💡: deliver_value");
        assert_eq!(
            pairs,
            vec![
                ("🚀".to_string(), "ship_v1".to_string()),
                ("💡".to_string(), "deliver_value".to_string()),
            ]
        );
    }

    #[test]
    fn test_slash_segments() {
        let map = tokenize_map(&reg(), "/act: ship\n/intent: why");
        assert_eq!(map.get("/act").map(String::as_str), Some("ship"));
        assert_eq!(map.get("/intent").map(String::as_str), Some("why"));
    }

    #[test]
    fn test_unknown_slash_token_kept() {
        let map = tokenize_map(&reg(), "/custom_thing: value");
        assert_eq!(map.get("/custom_thing").map(String::as_str), Some("value"));
    }

    #[test]
    fn test_multiline_value_preserved() {
        let text = "❓: first line\nsecond line\n\nthird line\n📦: answer";
        let map = tokenize_map(&reg(), text);
        assert_eq!(
            map.get("/query").map(String::as_str),
            Some("first line\nsecond line\n\nthird line")
        );
        assert_eq!(map.get("/deliverable").map(String::as_str), Some("answer"));
    }

    #[test]
    fn test_preamble_discarded() {
        let map = tokenize_map(&reg(), "Hello there.\nSome notes\n🚀: go");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("/act").map(String::as_str), Some("go"));
    }

    #[test]
    fn test_no_tokens() {
        assert!(tokenize(&reg(), "").is_empty());
        assert!(tokenize(&reg(), "just some words: with a colon").is_empty());
        assert!(tokenize(&reg(), "   \n\t\n").is_empty());
    }

    #[test]
    fn test_mid_line_token_not_a_segment() {
        let map = tokenize_map(&reg(), "🚀: launch /intent: inline");
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get("/act").map(String::as_str),
            Some("launch /intent: inline")
        );
    }

    #[test]
    fn test_duplicate_keeps_position_takes_last_value() {
        let map = tokenize_map(&reg(), "🚀: one\n💡: why\n/act: two");
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["/act", "/intent"]);
        assert_eq!(map.get("/act").map(String::as_str), Some("two"));
    }

    #[test]
    fn test_symbol_and_slash_forms_merge() {
        let map = tokenize_map(&reg(), "🎯: a\n/context: b");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("/context").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_multi_codepoint_symbol() {
        let map = tokenize_map(&reg(), "🧠🧠: reflecting\n🧠: Human");
        assert_eq!(map.get("/meta").map(String::as_str), Some("reflecting"));
        assert_eq!(map.get("/mind").map(String::as_str), Some("Human"));
    }

    #[test]
    fn test_empty_value_and_no_space() {
        let map = tokenize_map(&reg(), "🚀:\n💡:tight");
        assert_eq!(map.get("/act").map(String::as_str), Some(""));
        assert_eq!(map.get("/intent").map(String::as_str), Some("tight"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let map = tokenize_map(&reg(), "🚀: go\r\n💡: why\r\n");
        assert_eq!(map.get("/act").map(String::as_str), Some("go"));
        assert_eq!(map.get("/intent").map(String::as_str), Some("why"));
    }

    #[test]
    fn test_symbol_without_colon_is_text() {
        let map = tokenize_map(&reg(), "🚀 launch day\n/act launch");
        assert!(map.is_empty());
    }

    #[test]
    fn test_indented_token_is_not_a_segment() {
        let map = tokenize_map(&reg(), "📝: notes\n  /act: not a segment");
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get("/note").map(String::as_str),
            Some("notes\n  /act: not a segment")
        );
    }

    #[test]
    fn test_leading_bom_ignored() {
        let map = tokenize_map(&reg(), "\u{feff}🚀: go\n💡: why");
        assert_eq!(map.get("/act").map(String::as_str), Some("go"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_unregistered_symbol_run_is_text() {
        // 🧠🧠 is the longest registered prefix; the trailing 🧠 keeps the
        // colon out of reach, and 🧠🧠🧠 is not a token.
        assert!(tokenize(&reg(), "🧠🧠🧠: x").is_empty());
        let map = tokenize_map(&reg(), "📝: note\n🧠🧠🧠: still the note");
        assert_eq!(
            map.get("/note").map(String::as_str),
            Some("note\n🧠🧠🧠: still the note")
        );
    }
}
