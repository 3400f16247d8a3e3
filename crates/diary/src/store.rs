//! Append-only plain-text diary file.
//!
//! Each entry is written as a dated block:
//!
//! ```text
//! June 01, 2024:
//! I had a wonderful day at the park!
//!
//! ```
//!
//! A blank line always ends a block, so the raw text splits back into entries
//! on blank lines.

use chrono::Local;
use lifecapsule_core::{AppError, AppResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::io::SeekFrom;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Date header format, e.g. "June 01, 2024".
pub const TIMESTAMP_FORMAT: &str = "%B %d, %Y";

/// A single saved entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiaryEntry {
    pub timestamp: String,
    pub text: String,
}

impl DiaryEntry {
    /// Build an entry, trimming the text and collapsing blank lines.
    pub fn new(timestamp: impl Into<String>, text: &str) -> Self {
        let text = text
            .trim()
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            timestamp: timestamp.into(),
            text,
        }
    }

    /// Text block as written to the file.
    pub fn to_block(&self) -> String {
        format!("{}:\n{}\n\n", self.timestamp, self.text)
    }
}

/// Split raw diary text into entry blocks.
///
/// Any whitespace-only line ends a block, so `\r\n` files split the same way.
pub fn entries(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(begin) = start.take() {
                blocks.push(text[begin..end].trim());
            }
        } else {
            start.get_or_insert(offset);
            end = offset + line.len();
        }
        offset += line.len();
    }

    if let Some(begin) = start {
        blocks.push(text[begin..end].trim());
    }

    blocks
}

/// Handle to the diary file.
#[derive(Debug, Clone)]
pub struct DiaryStore {
    path: PathBuf,
}

impl DiaryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full diary text. A missing or unreadable file reads as empty; invalid
    /// UTF-8 is replaced rather than discarding the whole diary.
    pub async fn load(&self) -> String {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(path = ?self.path, "Diary is not valid UTF-8");
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                tracing::error!(path = ?self.path, "Error loading diary entries: {}", e);
                String::new()
            }
        }
    }

    /// Append an entry dated today (local time).
    pub async fn append(&self, text: &str) -> AppResult<DiaryEntry> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.append_dated(&timestamp, text).await
    }

    /// Append an entry under an explicit date header.
    pub async fn append_dated(&self, timestamp: &str, text: &str) -> AppResult<DiaryEntry> {
        let entry = DiaryEntry::new(timestamp, text);
        if entry.text.is_empty() {
            return Err(AppError::Diary("No entry provided.".to_string()));
        }

        self.write_block(&entry.to_block()).await.map_err(|e| {
            tracing::error!(path = ?self.path, "Error saving diary entry: {}", e);
            AppError::Io(e)
        })?;

        tracing::info!(path = ?self.path, timestamp = %entry.timestamp, "Diary entry saved");
        Ok(entry)
    }

    async fn write_block(&self, block: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        // Keep the blank-line separator if the file was edited by hand
        let len = file.metadata().await?.len();
        if len > 0 && !self.ends_with_blank_line(len).await? {
            file.write_all(b"\n\n").await?;
        }

        file.write_all(block.as_bytes()).await?;
        file.flush().await
    }

    /// Looks at the last two bytes only; the rest of the file may be any encoding.
    async fn ends_with_blank_line(&self, len: u64) -> std::io::Result<bool> {
        if len < 2 {
            return Ok(false);
        }

        let mut file = tokio::fs::File::open(&self.path).await?;
        file.seek(SeekFrom::End(-2)).await?;
        let mut tail = [0u8; 2];
        file.read_exact(&mut tail).await?;
        Ok(&tail == b"\n\n")
    }
}
