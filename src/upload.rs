// src/upload.rs
//! Collects the files a user selects before an analysis run.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// A file selected for upload. Lives only as long as the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    /// Where the bytes live; only read when the file is actually sent.
    pub source: PathBuf,
    pub uploaded_at: DateTime<Utc>,
}

/// What the user picked, before the collector assigns identity.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub source: PathBuf,
}

impl SelectedFile {
    /// Stat a file on disk. Content is not inspected.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            mime_type: content_type_for(&name).to_string(),
            name,
            size: metadata.len(),
            source: path.to_path_buf(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadStats {
    pub count: usize,
    pub total_size: u64,
}

/// Ordered list of selected files. Every mutation swaps in a new sequence,
/// so a snapshot taken by an observer never changes underneath it.
#[derive(Debug, Clone)]
pub struct UploadCollector {
    files: Arc<[UploadedFile]>,
}

impl Default for UploadCollector {
    fn default() -> Self {
        Self {
            files: Arc::from(Vec::new()),
        }
    }
}

impl UploadCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, files: Vec<SelectedFile>) -> Vec<Uuid> {
        let now = Utc::now();
        let added: Vec<UploadedFile> = files
            .into_iter()
            .map(|f| UploadedFile {
                id: Uuid::new_v4(),
                name: f.name,
                size: f.size,
                mime_type: f.mime_type,
                source: f.source,
                uploaded_at: now,
            })
            .collect();
        let ids = added.iter().map(|f| f.id).collect();

        self.files = self.files.iter().cloned().chain(added).collect();
        debug!("Upload collector now holds {} file(s)", self.files.len());
        ids
    }

    /// Stat each path and add it. Nothing is added if any path fails.
    pub fn add_paths(&mut self, paths: &[PathBuf]) -> Result<Vec<Uuid>> {
        let selected = paths
            .iter()
            .map(|p| SelectedFile::from_path(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.add(selected))
    }

    /// Remove one entry by id. Unknown ids are ignored.
    pub fn remove(&mut self, id: Uuid) -> bool {
        if !self.files.iter().any(|f| f.id == id) {
            return false;
        }
        self.files = self.files.iter().filter(|f| f.id != id).cloned().collect();
        true
    }

    pub fn clear(&mut self) {
        self.files = Arc::from(Vec::new());
    }

    pub fn snapshot(&self) -> Arc<[UploadedFile]> {
        Arc::clone(&self.files)
    }

    pub fn first(&self) -> Option<&UploadedFile> {
        self.files.first()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Derived from the current contents on every call.
    pub fn stats(&self) -> UploadStats {
        UploadStats {
            count: self.files.len(),
            total_size: self.files.iter().map(|f| f.size).sum(),
        }
    }
}

/// MIME type by extension, `application/octet-stream` otherwise
pub fn content_type_for(file_name: &str) -> &'static str {
    let lower_name = file_name.to_lowercase();
    if lower_name.ends_with(".pdf") {
        "application/pdf"
    } else if lower_name.ends_with(".docx") {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    } else if lower_name.ends_with(".doc") {
        "application/msword"
    } else if lower_name.ends_with(".txt") {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}

/// Human-readable size on a 1024 base, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
