//! Outcome sinks.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use provisioner_core::Outcome;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

use crate::collab::{OutcomeSink, SinkError};

/// Line format of a [`FileOutcomeSink`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// `2024/01/31 10:15:02 628100001 SUCCESS 0000 Operation successfully.`
    #[default]
    Text,
    /// One serialized [`Outcome`] per line.
    Json,
}

impl LogFormat {
    fn render(self, outcome: &Outcome) -> Result<String, SinkError> {
        let mut line = match self {
            Self::Text => render_text(outcome),
            Self::Json => serde_json::to_string(outcome)?,
        };
        line.push('\n');
        Ok(line)
    }
}

fn render_text(outcome: &Outcome) -> String {
    let mut line = format!(
        "{} {} {}",
        outcome.recorded_at.format("%Y/%m/%d %H:%M:%S"),
        outcome.identifier,
        outcome.status
    );
    for part in [&outcome.code, &outcome.description].into_iter().flatten() {
        line.push(' ');
        // keep one record per line
        line.push_str(&part.replace(['\r', '\n'], " "));
    }
    line
}

/// Appends one line per outcome to a file.
pub struct FileOutcomeSink {
    path: PathBuf,
    format: LogFormat,
    writer: Mutex<BufWriter<File>>,
}

impl FileOutcomeSink {
    /// Open `path` for appending, creating it and its parent directories.
    pub async fn create(path: impl AsRef<Path>, format: LogFormat) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            format,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }
}

#[async_trait]
impl OutcomeSink for FileOutcomeSink {
    async fn append(&self, outcome: &Outcome) -> Result<(), SinkError> {
        let line = self.format.render(outcome)?;
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().await;
        writer.flush().await?;
        Ok(())
    }
}

impl std::fmt::Debug for FileOutcomeSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileOutcomeSink")
            .field("path", &self.path)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Keeps every outcome in memory.
#[derive(Debug, Default)]
pub struct MemoryOutcomeSink {
    outcomes: Mutex<Vec<Outcome>>,
}

impl MemoryOutcomeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the outcomes recorded so far, in write order.
    pub async fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.outcomes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.outcomes.lock().await.is_empty()
    }
}

#[async_trait]
impl OutcomeSink for MemoryOutcomeSink {
    async fn append(&self, outcome: &Outcome) -> Result<(), SinkError> {
        self.outcomes.lock().await.push(outcome.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provisioner_core::OutcomeStatus;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_text_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let sink = FileOutcomeSink::create(&path, LogFormat::Text).await.unwrap();

        sink.append(&Outcome::success(628100001, 0, "0000", "Operation successfully."))
            .await
            .unwrap();
        sink.append(&Outcome::transport_error(628100002, 1, "connection refused"))
            .await
            .unwrap();
        sink.flush().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("628100001 SUCCESS 0000 Operation successfully."));
        assert!(lines[1].ends_with("628100002 TRANSPORT_ERROR connection refused"));
    }

    #[tokio::test]
    async fn test_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let sink = FileOutcomeSink::create(&path, LogFormat::Json).await.unwrap();

        sink.append(&Outcome::business_failure(5, 2, "102010004", "exists"))
            .await
            .unwrap();
        sink.flush().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let outcome: Outcome = serde_json::from_str(content.trim_end()).unwrap();
        assert_eq!(outcome.identifier, 5);
        assert_eq!(outcome.status, OutcomeStatus::BusinessFailure);
        assert_eq!(outcome.code.as_deref(), Some("102010004"));
    }

    #[tokio::test]
    async fn test_creates_parent_directories_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("nested").join("run.log");

        let sink = FileOutcomeSink::create(&path, LogFormat::Text).await.unwrap();
        sink.append(&Outcome::success(1, 0, "0000", "")).await.unwrap();
        sink.flush().await.unwrap();
        drop(sink);

        let sink = FileOutcomeSink::create(&path, LogFormat::Text).await.unwrap();
        sink.append(&Outcome::success(2, 0, "0000", "")).await.unwrap();
        sink.flush().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_multiline_description_stays_on_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let sink = FileOutcomeSink::create(&path, LogFormat::Text).await.unwrap();

        sink.append(&Outcome::decode_error(9, 0, "bad\nxml")).await.unwrap();
        sink.flush().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("bad xml"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let sink = Arc::new(FileOutcomeSink::create(&path, LogFormat::Json).await.unwrap());

        let mut handles = Vec::new();
        for worker in 0..8usize {
            let sink = sink.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50u64 {
                    let id = worker as u64 * 1000 + i;
                    sink.append(&Outcome::success(id, worker, "0000", "ok"))
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        sink.flush().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Outcome> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(parsed.len(), 400);
    }

    #[tokio::test]
    async fn test_memory_sink_collects() {
        let sink = MemoryOutcomeSink::new();
        assert!(sink.is_empty().await);
        sink.append(&Outcome::success(1, 0, "0000", "")).await.unwrap();
        sink.append(&Outcome::internal_fault(2, 0, "panic")).await.unwrap();
        assert_eq!(sink.len().await, 2);
        assert_eq!(sink.outcomes().await[1].status, OutcomeStatus::InternalFault);
    }
}
