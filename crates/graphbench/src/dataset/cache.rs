//! Persistent dataset property cache.
//!
//! A single JSON document shaped `{ dataset: { key: value } }`. Every access
//! re-reads and re-writes the whole document, so only one writer may use a
//! given file at a time.

use crate::error::BenchError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Cached properties of one dataset.
pub type Properties = Map<String, Value>;

/// File-backed key-value store scoped by dataset name.
#[derive(Debug, Clone)]
pub struct PropertyCache {
    path: PathBuf,
}

impl PropertyCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document.
    ///
    /// A missing or blank file is an empty cache; anything else that does not
    /// parse is [`BenchError::CacheCorruption`].
    pub fn load(&self) -> crate::Result<BTreeMap<String, Properties>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(|source| self.corrupted(source))
    }

    fn store(&self, doc: &BTreeMap<String, Properties>) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(doc)?)?;
        Ok(())
    }

    fn corrupted(&self, source: serde_json::Error) -> BenchError {
        BenchError::CacheCorruption {
            path: self.path.clone(),
            source,
        }
    }

    /// Look up a property.
    pub fn get<T: DeserializeOwned>(&self, dataset: &str, key: &str) -> crate::Result<Option<T>> {
        let doc = self.load()?;
        let Some(value) = doc.get(dataset).and_then(|props| props.get(key)) else {
            return Ok(None);
        };
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|source| self.corrupted(source))
    }

    /// Store a property, replacing any previous value.
    pub fn set<T: Serialize>(&self, dataset: &str, key: &str, value: &T) -> crate::Result<()> {
        let mut doc = self.load()?;
        doc.entry(dataset.to_string())
            .or_default()
            .insert(key.to_string(), serde_json::to_value(value)?);
        self.store(&doc)
    }

    /// Return the cached property, computing and storing it on a miss.
    pub fn get_or_eval<T, F>(&self, dataset: &str, key: &str, eval: F) -> crate::Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> crate::Result<T>,
    {
        if let Some(cached) = self.get(dataset, key)? {
            tracing::trace!(dataset, key, "property cache hit");
            return Ok(cached);
        }
        let value = eval()?;
        self.set(dataset, key, &value)?;
        tracing::debug!(dataset, key, "property cached");
        Ok(value)
    }

    /// Forget every property of one dataset. Returns whether anything was removed.
    pub fn remove(&self, dataset: &str) -> crate::Result<bool> {
        let mut doc = self.load()?;
        let removed = doc.remove(dataset).is_some();
        if removed {
            self.store(&doc)?;
        }
        Ok(removed)
    }

    /// Forget everything.
    pub fn clear(&self) -> crate::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
