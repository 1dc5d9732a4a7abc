use chrono::Utc;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Append-only diagnostic sink for unexpected failures.
///
/// Best-effort: a failed write is reported through `tracing` and otherwise
/// ignored. The file is never read back.
#[derive(Clone, Debug)]
pub struct ErrorLog {
    path: Option<Arc<PathBuf>>,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(Arc::new(path.into())),
        }
    }

    /// A sink that drops everything.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    /// Append one `<timestamp>, <error>` line.
    pub async fn record(&self, err: &(dyn Display + Sync)) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        let line = format!("{}, {}\n", Utc::now().to_rfc3339(), err);
        if let Err(e) = append(path, &line).await {
            warn!(path = %path.display(), error = %e, "failed to append to error log");
        }
    }
}

async fn append(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}
