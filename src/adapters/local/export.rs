use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::ports::{ExportError, ExportSink};

/// Writes exports into a directory. Bytes are staged in a temporary file
/// next to the target and renamed into place, so a failed export leaves
/// nothing behind.
#[derive(Debug, Clone)]
pub struct FileExportSink {
    dir: PathBuf,
}

impl FileExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for FileExportSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            return Err(ExportError::Persist(format!("invalid file name '{}'", file_name)));
        }

        std::fs::create_dir_all(&self.dir)?;

        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(bytes)?;
        staged.flush()?;

        let target = self.dir.join(file_name);
        staged
            .persist(&target)
            .map_err(|e| ExportError::Persist(e.error.to_string()))?;

        tracing::debug!(path = %target.display(), bytes = bytes.len(), "Export written");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_writes_single_file() {
        let dir = TempDir::new().unwrap();
        let sink = FileExportSink::new(dir.path().join("exports"));

        let path = sink.save("wallets-export-2024-01-01.json", b"[]").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"[]");

        // No staging file left behind
        let entries: Vec<_> = std::fs::read_dir(sink.dir()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_overwrites_same_day() {
        let dir = TempDir::new().unwrap();
        let sink = FileExportSink::new(dir.path());

        sink.save("wallets-export-2024-01-01.csv", b"old").unwrap();
        let path = sink.save("wallets-export-2024-01-01.csv", b"new").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "new");
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = TempDir::new().unwrap();
        let sink = FileExportSink::new(dir.path());
        assert!(sink.save("../escape.json", b"x").is_err());
        assert!(sink.save("", b"x").is_err());
    }
}
