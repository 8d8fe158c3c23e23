pub mod config;
pub mod data_dir;
pub mod error;
pub mod store;

pub use config::{AgentConfig, AgentsConfig, Config};
pub use data_dir::{DataDir, default_base_dir};
pub use error::{Result, StoreError};
pub use store::{ConversationStore, read_json, write_json, write_text};
