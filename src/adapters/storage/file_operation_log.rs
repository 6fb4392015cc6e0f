//! File-based Operation Log Adapter
//!
//! Appends one JSON object per line. Appends are serialized through a mutex
//! so concurrent writers never interleave partial lines. `tail` reads the
//! file backwards in fixed-size chunks and stops once it holds enough lines.

use async_trait::async_trait;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::ports::{LogError, OperationLog, OperationLogEntry};

const TAIL_CHUNK_BYTES: u64 = 8 * 1024;

/// JSON-lines operation log on disk
#[derive(Debug)]
pub struct FileOperationLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileOperationLog {
    /// Create a log writing to `path`
    ///
    /// # Example
    /// ```ignore
    /// let log = FileOperationLog::new("./data/reconciliation.log");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent(&self) -> Result<(), LogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }
}

/// Non-blank lines in `buf`. Unless `from_start`, the first segment may be
/// cut mid-line and is dropped.
fn complete_lines(buf: &[u8], from_start: bool) -> Vec<&[u8]> {
    let mut segments = buf.split(|b| *b == b'\n');
    if !from_start {
        segments.next();
    }
    segments
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .collect()
}

#[async_trait]
impl OperationLog for FileOperationLog {
    async fn append(&self, entry: OperationLogEntry) -> Result<(), LogError> {
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        self.ensure_parent().await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn tail(&self, lines: usize) -> Result<Vec<OperationLogEntry>, LogError> {
        if lines == 0 {
            return Ok(Vec::new());
        }

        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut pos = file.metadata().await?.len();
        let mut buf: Vec<u8> = Vec::new();
        while pos > 0 && complete_lines(&buf, false).len() < lines {
            let step = TAIL_CHUNK_BYTES.min(pos);
            pos -= step;
            file.seek(SeekFrom::Start(pos)).await?;
            let mut chunk = vec![0u8; step as usize];
            file.read_exact(&mut chunk).await?;
            chunk.extend_from_slice(&buf);
            buf = chunk;
        }

        let all = complete_lines(&buf, pos == 0);
        let start = all.len().saturating_sub(lines);

        let mut entries = Vec::with_capacity(all.len() - start);
        for line in &all[start..] {
            match serde_json::from_slice::<OperationLogEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable operation log line"),
            }
        }
        Ok(entries)
    }
}
