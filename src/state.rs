//! Persisted dedup snapshot.
//!
//! One small JSON object on disk, target slug → last dedup key. The key is
//! written only after the gated action has succeeded, so a crash in between
//! re-fires the action on the next run at most once rather than losing it.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use chrono_tz::Tz;

use crate::Result;

/// Canonical dedup key: slug plus the zone-aware RFC 3339 instant of the
/// fact acted upon. Persisted keys always use this representation.
pub fn dedup_key(slug: &str, instant: DateTime<Tz>) -> String {
    format!("{}|{}", slug, instant.to_rfc3339())
}

/// Mapping from target slug to the dedup key last acted upon.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl DedupStore {
    /// Load the snapshot. A missing file is an empty map; a corrupt file is
    /// logged and treated as empty. Never fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    log::warn!("Corrupt dedup snapshot {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                log::warn!("Failed to read dedup snapshot {}: {}", path.display(), e);
                HashMap::new()
            }
        };

        log::debug!("Loaded {} dedup entries", entries.len());
        DedupStore { path, entries }
    }

    pub fn get(&self, slug: &str) -> Option<&str> {
        self.entries.get(slug).map(String::as_str)
    }

    pub fn set(&mut self, slug: &str, key: &str) {
        self.entries.insert(slug.to_string(), key.to_string());
    }

    /// Write the snapshot back to disk. Callers log failures and carry on:
    /// a lost flush means one possible duplicate action next run, which
    /// beats silently dropping future updates.
    pub fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
