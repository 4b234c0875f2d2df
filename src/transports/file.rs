//! File transport for non-blocking log file writing
//!
//! Writes each entry as a single-line JSON object (JSONL format) using
//! `tokio::fs`. Server-side only: `supports` refuses a client execution
//! context so the registry rejects it at registration time instead of
//! failing on every write.

use crate::core::{ExecutionContext, LogEntry, LoggerError, Result, Transport};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

pub struct FileTransport {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileTransport {
    /// Default buffer size (64 KB)
    pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

    /// Open (or create) a log file in append mode
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_buffer_size(path, Self::DEFAULT_BUFFER_SIZE).await
    }

    pub async fn with_buffer_size(path: impl AsRef<Path>, buffer_size: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            writer: BufWriter::with_capacity(buffer_size, file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Transport for FileTransport {
    fn name(&self) -> &str {
        "file"
    }

    async fn write(&mut self, entry: &LogEntry) -> Result<()> {
        let mut line = entry.to_json()?;
        line.push('\n');

        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(LoggerError::from)?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await.map_err(LoggerError::from)?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.flush().await.map_err(LoggerError::from)?;
        self.writer.get_mut().sync_all().await.map_err(LoggerError::from)?;
        Ok(())
    }

    fn supports(&self, context: ExecutionContext) -> bool {
        context == ExecutionContext::Server
    }
}
