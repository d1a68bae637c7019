use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to persist export file: {0}")]
    Persist(String),
}

/// Destination for a downloaded export document
pub trait ExportSink: Send + Sync {
    /// Store one export artifact and return where it landed
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError>;
}
