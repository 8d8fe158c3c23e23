use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use ng_core::{Conversation, ConversationExport, export_json, export_text};

use crate::error::{Result, StoreError, io_err};

const FILE_PREFIX: &str = "ng_conversation_";

/// Directory of JSON conversation exports, one file per conversation.
pub struct ConversationStore {
    dir: PathBuf,
}

impl ConversationStore {
    /// Open `dir`, creating it if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).map_err(io_err(dir))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/ng_conversation_<id>.json`
    pub fn path_for(&self, conversation_id: &str) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{conversation_id}.json"))
    }

    /// Write the conversation under its id, replacing an earlier save of the
    /// same conversation. A file holding a different conversation is never
    /// replaced: the save moves on to `<id>_2`, `<id>_3`, ...
    pub fn save(&self, conversation: &Conversation) -> Result<PathBuf> {
        let mut attempt = 1;
        loop {
            let id = match attempt {
                1 => conversation.id.clone(),
                n => format!("{}_{n}", conversation.id),
            };
            let path = self.path_for(&id);
            let mut export = ConversationExport::from_conversation(conversation);
            export.conversation_id = id;
            let json = serde_json::to_string_pretty(&export)?;

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => file.write_all(json.as_bytes()).map_err(io_err(&path))?,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if !holds_earlier_save(&path, conversation) {
                        tracing::debug!("{} belongs to another conversation", path.display());
                        attempt += 1;
                        continue;
                    }
                    fs::write(&path, json).map_err(io_err(&path))?;
                }
                Err(e) => return Err(io_err(&path)(e)),
            }

            tracing::info!(
                "saved conversation {} ({} messages) to {}",
                export.conversation_id,
                conversation.len(),
                path.display()
            );
            return Ok(path);
        }
    }

    /// Load by id from this store.
    pub fn load(&self, conversation_id: &str, sticky_keys: &[String]) -> Result<Conversation> {
        read_json(&self.path_for(conversation_id), sticky_keys)
    }

    /// Saved conversation files, oldest first. Ids are timestamps, so name
    /// order is chronological.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(io_err(&self.dir))?;
        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension().is_some_and(|ext| ext == "json")
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(FILE_PREFIX))
            })
            .collect();
        paths.sort();
        Ok(paths)
    }
}

/// Whether `path` holds this conversation as saved earlier: its messages are
/// a prefix of the current history.
fn holds_earlier_save(path: &Path, conversation: &Conversation) -> bool {
    let Ok(content) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(stored) = serde_json::from_str::<ConversationExport>(&content) else {
        return false;
    };
    conversation.history().starts_with(&stored.messages)
}

/// Write a conversation export to an arbitrary path.
pub fn write_json(path: &Path, conversation: &Conversation) -> Result<()> {
    let json = export_json(conversation)?;
    fs::write(path, json).map_err(io_err(path))
}

/// Read a conversation export, keeping `sticky_keys` of its active context.
pub fn read_json(path: &Path, sticky_keys: &[String]) -> Result<Conversation> {
    let content = fs::read_to_string(path).map_err(io_err(path))?;
    let export: ConversationExport = serde_json::from_str(&content).map_err(|e| {
        StoreError::InvalidData(format!("{} is not a conversation export: {e}", path.display()))
    })?;
    tracing::debug!(
        "loaded conversation {} ({} messages) from {}",
        export.conversation_id,
        export.messages.len(),
        path.display()
    );
    Ok(export.into_conversation_with(sticky_keys.iter().cloned()))
}

/// Write the plain-text transcript of a conversation.
pub fn write_text(path: &Path, conversation: &Conversation) -> Result<()> {
    fs::write(path, export_text(conversation)).map_err(io_err(path))
}
