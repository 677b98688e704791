// src/core/store.rs
//! Local persistence for records that must survive page navigation

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::types::{AnalysisContext, AnalysisResult};

/// Current shape of every persisted envelope.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    GeneratedCoverLetter,
    AnalysisResults,
    AnalysisContext,
}

impl StorageKey {
    pub const ALL: [StorageKey; 3] = [
        StorageKey::GeneratedCoverLetter,
        StorageKey::AnalysisResults,
        StorageKey::AnalysisContext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::GeneratedCoverLetter => "generatedCoverLetter",
            StorageKey::AnalysisResults => "analysisResults",
            StorageKey::AnalysisContext => "analysisContext",
        }
    }
}

/// Raw string key-value storage, shaped like browser `localStorage`.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

// ===== In-memory backend =====

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock poisoned"))
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ===== File backend =====

/// One `<key>.json` file per record inside a directory. Writes go through a
/// temporary file and a rename so a reader never sees a torn record.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create storage directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        fs::write(&tmp, value)
            .with_context(|| format!("Failed to write file: {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace file: {}", path.display()))?;

        debug!("Written storage record: {}", path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove file: {}", path.display()))?;
        }
        Ok(())
    }
}

// ===== Typed store =====

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a, T> {
    schema_version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    schema_version: u32,
    data: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionProbe {
    schema_version: Option<u32>,
}

/// Typed access to the persisted records. Each record is stored as
/// `{"schemaVersion": 1, "data": ...}`; a record written under another
/// version reads back as absent.
pub struct LocalStore {
    backend: Box<dyn StorageBackend>,
}

impl LocalStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(FileStorage::new(dir)?))
    }

    fn get<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>> {
        let Some(raw) = self.backend.get(key.as_str())? else {
            return Ok(None);
        };

        let probe: VersionProbe = serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt storage record: {}", key.as_str()))?;
        if probe.schema_version != Some(SCHEMA_VERSION) {
            warn!(
                "Ignoring {} written with schema version {:?} (expected {})",
                key.as_str(),
                probe.schema_version,
                SCHEMA_VERSION
            );
            return Ok(None);
        }

        let envelope: Envelope<T> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to decode storage record: {}", key.as_str()))?;
        debug_assert_eq!(envelope.schema_version, SCHEMA_VERSION);
        Ok(Some(envelope.data))
    }

    fn set<T: Serialize>(&self, key: StorageKey, value: &T) -> Result<()> {
        let raw = serde_json::to_string(&EnvelopeRef {
            schema_version: SCHEMA_VERSION,
            data: value,
        })
        .with_context(|| format!("Failed to encode storage record: {}", key.as_str()))?;
        self.backend.set(key.as_str(), &raw)
    }

    pub fn clear(&self, key: StorageKey) -> Result<()> {
        self.backend.remove(key.as_str())
    }

    pub fn clear_all(&self) -> Result<()> {
        for key in StorageKey::ALL {
            self.clear(key)?;
        }
        info!("Cleared all persisted records");
        Ok(())
    }

    pub fn analysis_results(&self) -> Result<Option<AnalysisResult>> {
        self.get(StorageKey::AnalysisResults)
    }

    pub fn set_analysis_results(&self, result: &AnalysisResult) -> Result<()> {
        self.set(StorageKey::AnalysisResults, result)
    }

    pub fn analysis_context(&self) -> Result<Option<AnalysisContext>> {
        self.get(StorageKey::AnalysisContext)
    }

    pub fn set_analysis_context(&self, context: &AnalysisContext) -> Result<()> {
        self.set(StorageKey::AnalysisContext, context)
    }

    pub fn cover_letter(&self) -> Result<Option<String>> {
        self.get(StorageKey::GeneratedCoverLetter)
    }

    pub fn set_cover_letter(&self, letter: &str) -> Result<()> {
        self.set(StorageKey::GeneratedCoverLetter, &letter)
    }

    /// Write both analysis records. If the context write fails the previous
    /// results record is restored, so storage never holds half a session.
    pub fn persist_analysis(&self, result: &AnalysisResult, context: &AnalysisContext) -> Result<()> {
        let results_key = StorageKey::AnalysisResults.as_str();
        let previous = self.backend.get(results_key)?;

        self.set_analysis_results(result)?;
        if let Err(err) = self.set_analysis_context(context) {
            let rollback = match &previous {
                Some(raw) => self.backend.set(results_key, raw),
                None => self.backend.remove(results_key),
            };
            if let Err(rollback_err) = rollback {
                warn!("Failed to roll back {}: {:#}", results_key, rollback_err);
            }
            return Err(err.context("Failed to persist analysis context"));
        }
        Ok(())
    }
}
