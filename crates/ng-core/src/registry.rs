//! Bidirectional symbol ↔ canonical identifier table.
//!
//! Symbols may be declared more than once in a source table. The first
//! declaration owns the symbol; later ones are kept as shadowed entries so the
//! collision stays visible. A canonical whose symbol is owned by another
//! canonical has no display symbol and is written in slash form.

use std::collections::HashMap;

/// The fixed NeuroGlyph table, in declaration order.
const NEUROGLYPH_TABLE: &[(&str, &str)] = &[
    // Core
    ("🚀", "/act"),
    ("📚", "/focus"),
    ("🧠", "/mind"),
    ("🎯", "/context"),
    ("💡", "/intent"),
    ("📦", "/deliverable"),
    ("⏰", "/timeline"),
    ("🔥", "/pulse"),
    ("🏔️", "/gliph"),
    ("🔗", "/relation"),
    ("🌐", "/network"),
    ("🔄", "/compose"),
    ("🔍", "/zoom"),
    ("🎛️", "/switch_context"),
    ("⛓️", "/chain"),
    ("📢", "/echo"),
    ("🔧", "/resolve"),
    ("📝", "/note"),
    ("📊", "/metric"),
    ("📡", "/channel"),
    ("👥", "/collective"),
    ("🎭", "/role"),
    // Extended
    ("🏛️", "/govern"),
    ("📋", "/norm"),
    ("💰", "/resource"),
    ("🤝", "/trust"),
    ("🎯", "/goal"),
    ("⚡", "/trigger"),
    ("🎨", "/palette"),
    ("👤", "/character"),
    ("🌍", "/setting"),
    ("📖", "/lore"),
    ("🎲", "/turn"),
    ("🌱", "/seed"),
    ("🎵", "/motif"),
    ("🏗️", "/structure"),
    ("👁️", "/pov"),
    ("✨", "/flourish"),
    // Research & meta
    ("❓", "/query"),
    ("🔄", "/ongoing"),
    ("🌉", "/bridge"),
    ("⚖️", "/dialectic"),
    ("🧠🧠", "/meta"),
    ("📄", "/source"),
    ("🔄", "/transform"),
    ("🔍", "/introspect"),
];

/// A symbol declared again after its first owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collision {
    pub symbol: String,
    /// Canonical that resolves from the symbol.
    pub owner: String,
    /// Canonical whose declaration lost.
    pub shadowed: String,
}

#[derive(Clone, Debug)]
pub struct Registry {
    to_canonical: HashMap<String, String>,
    to_symbol: HashMap<String, String>,
    /// Owned symbols, longest first, for prefix matching at line starts.
    symbols_by_len: Vec<String>,
    collisions: Vec<Collision>,
}

impl Registry {
    /// Build from `(symbol, canonical)` pairs. Duplicate canonicals keep their
    /// first pairing; duplicate symbols keep their first owner.
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut to_canonical: HashMap<String, String> = HashMap::new();
        let mut to_symbol: HashMap<String, String> = HashMap::new();
        let mut collisions = Vec::new();

        for (symbol, canonical) in pairs {
            if to_symbol.contains_key(canonical) {
                continue;
            }
            match to_canonical.get(symbol) {
                Some(owner) => collisions.push(Collision {
                    symbol: symbol.to_string(),
                    owner: owner.clone(),
                    shadowed: canonical.to_string(),
                }),
                None => {
                    to_canonical.insert(symbol.to_string(), canonical.to_string());
                    to_symbol.insert(canonical.to_string(), symbol.to_string());
                }
            }
        }

        let mut symbols_by_len: Vec<String> = to_canonical.keys().cloned().collect();
        symbols_by_len.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        Self {
            to_canonical,
            to_symbol,
            symbols_by_len,
            collisions,
        }
    }

    /// The protocol's fixed table.
    pub fn neuroglyph() -> Self {
        Self::new(NEUROGLYPH_TABLE.iter().copied())
    }

    /// Canonical identifier for a known symbol; anything else passes through.
    pub fn resolve_to_canonical<'a>(&'a self, raw_token: &'a str) -> &'a str {
        self.to_canonical
            .get(raw_token)
            .map(String::as_str)
            .unwrap_or(raw_token)
    }

    /// Display symbol for a canonical identifier, if it owns one.
    pub fn resolve_to_symbol(&self, canonical: &str) -> Option<&str> {
        self.to_symbol.get(canonical).map(String::as_str)
    }

    /// Longest registered symbol that `text` starts with.
    pub fn match_symbol_prefix(&self, text: &str) -> Option<&str> {
        self.symbols_by_len
            .iter()
            .find(|s| text.starts_with(s.as_str()))
            .map(String::as_str)
    }

    pub fn is_symbol(&self, token: &str) -> bool {
        self.to_canonical.contains_key(token)
    }

    /// Symbols declared more than once, in table order.
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Number of symbols that resolve.
    pub fn len(&self) -> usize {
        self.to_canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_canonical.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::neuroglyph()
    }
}
