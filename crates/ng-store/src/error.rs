use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
    ConfigParse(toml::de::Error),
    ConfigWrite(toml::ser::Error),
    InvalidData(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, source } => write!(f, "I/O error on {}: {source}", path.display()),
            StoreError::Json(e) => write!(f, "JSON error: {e}"),
            StoreError::ConfigParse(e) => write!(f, "invalid config: {e}"),
            StoreError::ConfigWrite(e) => write!(f, "failed to serialize config: {e}"),
            StoreError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Json(e) => Some(e),
            StoreError::ConfigParse(e) => Some(e),
            StoreError::ConfigWrite(e) => Some(e),
            StoreError::InvalidData(_) => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(e: toml::de::Error) -> Self {
        StoreError::ConfigParse(e)
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(e: toml::ser::Error) -> Self {
        StoreError::ConfigWrite(e)
    }
}

/// Attach the offending path to an I/O error.
pub(crate) fn io_err(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.into();
    move |source| StoreError::Io { path, source }
}

pub type Result<T> = std::result::Result<T, StoreError>;
