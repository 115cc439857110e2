//! Backups as JSON-lines files on disk.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::backup::BackupRow;
use crate::error::{SweepError, SweepResult};
use crate::provider::BackupSink;

/// Writes each backup table to `<dir>/<slug>.jsonl`, one row per line.
/// The table identifier is the file path.
#[derive(Debug, Clone)]
pub struct JsonBackupSink {
    dir: PathBuf,
}

impl JsonBackupSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonBackupSink { dir: dir.into() }
    }
}

#[async_trait]
impl BackupSink for JsonBackupSink {
    async fn create_table(&self, name: &str) -> SweepResult<String> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            SweepError::Backup(format!("Could not create {}: {e}", self.dir.display()))
        })?;

        let path = self.dir.join(format!("{}.jsonl", slug::slugify(name)));
        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                SweepError::Backup(format!("Could not create {}: {e}", path.display()))
            })?;

        Ok(path.to_string_lossy().into_owned())
    }

    async fn append_rows(&self, table: &str, rows: &[BackupRow]) -> SweepResult<()> {
        let mut buf = String::new();
        for row in rows {
            let line =
                serde_json::to_string(row).map_err(|e| SweepError::Serialization(e.to_string()))?;
            buf.push_str(&line);
            buf.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(table)
            .await
            .map_err(|e| SweepError::Backup(format!("Could not open {table}: {e}")))?;
        file.write_all(buf.as_bytes())
            .await
            .map_err(|e| SweepError::Backup(format!("Could not write {table}: {e}")))?;
        file.flush()
            .await
            .map_err(|e| SweepError::Backup(format!("Could not write {table}: {e}")))?;

        Ok(())
    }
}
