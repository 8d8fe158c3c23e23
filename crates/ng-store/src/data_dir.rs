use std::env;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::store::ConversationStore;

/// Default base directory for all NeuroGlyph data.
pub fn default_base_dir() -> PathBuf {
    home_dir().join(".neuroglyph")
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Config plus conversation store under one base directory.
///
/// Layout:
/// ```text
/// ~/.neuroglyph/
/// ├── config.toml
/// └── conversations/
///     ├── ng_conversation_<id>.json
///     └── ...
/// ```
pub struct DataDir {
    base: PathBuf,
    config: Config,
    conversations: ConversationStore,
}

impl DataDir {
    /// Open `base_dir` (or the default), creating the config and
    /// conversations directory on first use.
    pub fn open(base_dir: Option<&Path>) -> Result<Self> {
        let base = base_dir.map(PathBuf::from).unwrap_or_else(default_base_dir);
        let config = Config::load_or_create(&base.join("config.toml"))?;
        let conversations = ConversationStore::open(&base.join("conversations"))?;
        tracing::debug!("opened data dir {}", base.display());
        Ok(Self {
            base,
            config,
            conversations,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }
}
