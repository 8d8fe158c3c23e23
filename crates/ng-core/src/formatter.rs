use crate::registry::Registry;
use crate::tokenizer::TokenMap;

/// Render a token map as one `<token>: <value>` line per entry, in map order.
///
/// With `prefer_symbol`, canonicals that own a symbol are written with it;
/// everything else is written as the canonical itself.
///
/// Re-tokenizing the output reproduces `tokens` unless a value contains a
/// line that itself opens a segment; such values split on re-parse.
pub fn format(registry: &Registry, tokens: &TokenMap, prefer_symbol: bool) -> String {
    tokens
        .iter()
        .map(|(canonical, value)| {
            let display = if prefer_symbol {
                registry
                    .resolve_to_symbol(canonical)
                    .unwrap_or(canonical.as_str())
            } else {
                canonical.as_str()
            };
            format!("{display}: {value}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
