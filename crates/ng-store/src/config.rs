use std::fs;
use std::path::Path;

use ng_core::{AgentKind, DEFAULT_HISTORY_WINDOW, DEFAULT_STICKY_KEYS};
use serde::{Deserialize, Serialize};

use crate::error::{Result, io_err};

/// How to reach one model participant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Name recorded on the agent's messages.
    pub name: String,
    /// External program that produces replies. It receives the priming
    /// context on stdin and the prompt as its last argument. Without one the
    /// front end falls back to an offline agent.
    ///
    /// Split on whitespace, so quoting is not understood. Arguments that
    /// contain spaces go in `args`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Extra arguments passed verbatim after the words of `command`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AgentsConfig {
    pub model_a: AgentConfig,
    pub model_b: AgentConfig,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            model_a: AgentConfig {
                name: "GPT-4".to_string(),
                command: None,
                args: Vec::new(),
            },
            model_b: AgentConfig {
                name: "Claude".to_string(),
                command: None,
                args: Vec::new(),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub default_participants: Vec<String>,
    /// Save the conversation when a chat session ends.
    pub auto_save: bool,
    /// Render tokens as symbols rather than `/word` identifiers.
    pub prefer_symbols: bool,
    pub history_window: usize,
    pub sticky_keys: Vec<String>,
    pub agents: AgentsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_participants: ["Human", "GPT-4", "Claude"].map(String::from).to_vec(),
            auto_save: true,
            prefer_symbols: true,
            history_window: DEFAULT_HISTORY_WINDOW,
            sticky_keys: DEFAULT_STICKY_KEYS.map(String::from).to_vec(),
            agents: AgentsConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(io_err(path))?;
        Self::from_toml(&content)
    }

    /// Load `path`, writing the defaults there first if it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let config = Self::load(path)?;
            tracing::debug!("loaded config from {}", path.display());
            return Ok(config);
        }

        let config = Self::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        fs::write(path, config.to_toml()?).map_err(io_err(path))?;
        tracing::info!("created default config: {}", path.display());
        Ok(config)
    }

    /// Agent settings for a model kind; `None` for humans.
    pub fn agent(&self, kind: AgentKind) -> Option<&AgentConfig> {
        match kind {
            AgentKind::Human => None,
            AgentKind::ModelA => Some(&self.agents.model_a),
            AgentKind::ModelB => Some(&self.agents.model_b),
        }
    }
}
