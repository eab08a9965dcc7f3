//! Destinations for encoded PDFs.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::export::ExportError;

/// Where exported PDFs are saved and served from.
///
/// Carried in `AppState` as `Arc<dyn PdfSink>`.
#[async_trait]
pub trait PdfSink: Send + Sync {
    /// Stores `bytes` under `file_name`, replacing any previous file. Returns
    /// the location it was written to.
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> Result<PathBuf, ExportError>;

    /// Reads back a previously saved file.
    async fn open(&self, file_name: &str) -> Result<Vec<u8>, ExportError>;
}

/// Writes exports into a directory on local disk.
///
/// Files are written to a temporary name and renamed into place so a
/// concurrent download never observes a half-written PDF.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl PdfSink for FileSink {
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> Result<PathBuf, ExportError> {
        let io_err = |path: &PathBuf| {
            let path = path.clone();
            move |source: std::io::Error| ExportError::Io { path, source }
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(io_err(&self.dir))?;

        let target = self.dir.join(file_name);
        let staging = self.dir.join(format!(".{file_name}.partial"));
        tokio::fs::write(&staging, &bytes)
            .await
            .map_err(io_err(&staging))?;
        tokio::fs::rename(&staging, &target)
            .await
            .map_err(io_err(&target))?;

        info!(path = %target.display(), bytes = bytes.len(), "Export written");
        Ok(target)
    }

    async fn open(&self, file_name: &str) -> Result<Vec<u8>, ExportError> {
        let path = self.dir.join(file_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ExportError::NotFound(file_name.to_string()))
            }
            Err(source) => Err(ExportError::Io { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_open_round_trips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("exports"));

        let path = sink.save("resume.pdf", b"%PDF-1.5 test".to_vec()).await.unwrap();
        assert!(path.ends_with("resume.pdf"));
        assert_eq!(sink.open("resume.pdf").await.unwrap(), b"%PDF-1.5 test");
    }

    #[tokio::test]
    async fn test_save_replaces_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());

        sink.save("coverLetter.pdf", b"first".to_vec()).await.unwrap();
        sink.save("coverLetter.pdf", b"second".to_vec()).await.unwrap();
        assert_eq!(sink.open("coverLetter.pdf").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_open_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());
        assert!(matches!(
            sink.open("resume.pdf").await,
            Err(ExportError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unwritable_directory_surfaces_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the export directory should be.
        let blocker = dir.path().join("exports");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let sink = FileSink::new(&blocker);
        let err = sink.save("resume.pdf", b"x".to_vec()).await.unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }), "got {err:?}");
    }
}
