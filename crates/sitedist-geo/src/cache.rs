//! Persistent address → coordinate cache.
//!
//! The file is one JSON object mapping canonical address keys to
//! `{lat, lon, matchLevel, matchDescription}`. Only the active calculation
//! run mutates the in-memory store; it is written back once per run.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sitedist_core::{Address, Coordinates, LocationMatch, SiteRecord};

use crate::error::CacheError;

const DEFAULT_DESCRIPTION: &str = "exact address";

/// One cached geocoding result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, alias = "match_level")]
    pub match_level: u8,
    #[serde(default = "default_description", alias = "match_desc")]
    pub match_description: String,
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_owned()
}

impl From<&LocationMatch> for CacheEntry {
    fn from(location: &LocationMatch) -> Self {
        Self {
            lat: location.coordinates.lat,
            lon: location.coordinates.lon,
            match_level: location.match_level,
            match_description: location.match_description.clone(),
        }
    }
}

impl From<&CacheEntry> for LocationMatch {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            coordinates: Coordinates::new(entry.lat, entry.lon),
            match_level: entry.match_level,
            match_description: entry.match_description.clone(),
        }
    }
}

/// In-memory view of the cache file.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
}

impl CacheStore {
    /// An empty store that will save to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Reads the cache file at `path`.
    ///
    /// Never fails: a missing file, unreadable file or corrupt content all
    /// produce an empty store (logged). Entries with out-of-range
    /// coordinates are dropped.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::empty(path);

        let raw = match fs::read_to_string(&store.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %store.path.display(), "no cache file found, starting empty");
                return store;
            }
            Err(e) => {
                tracing::warn!(path = %store.path.display(), error = %e, "failed to read cache file");
                return store;
            }
        };

        let parsed: BTreeMap<String, CacheEntry> = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(path = %store.path.display(), error = %e, "cache file is corrupt, ignoring it");
                return store;
            }
        };

        for (key, entry) in parsed {
            if Coordinates::new(entry.lat, entry.lon).is_valid() {
                store.entries.insert(key.to_lowercase(), entry);
            } else {
                tracing::warn!(%key, lat = entry.lat, lon = entry.lon, "dropping cache entry with invalid coordinates");
            }
        }

        tracing::info!(
            path = %store.path.display(),
            entries = store.entries.len(),
            "loaded coordinate cache"
        );
        store
    }

    /// Writes the store to its path, creating the parent directory if
    /// needed. The file is replaced atomically via a sibling temp file.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the directory, temp file or rename
    /// fails, or [`CacheError::Serialize`] if encoding fails.
    pub fn save(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let body = serde_json::to_string_pretty(&self.entries)?;
        let tmp = temp_path(&self.path);
        fs::write(&tmp, body).map_err(|source| CacheError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "saved coordinate cache");
        Ok(())
    }

    /// The canonical key for `address`.
    #[must_use]
    pub fn key(address: &Address) -> String {
        address.canonical_key()
    }

    #[must_use]
    pub fn get(&self, address: &Address) -> Option<LocationMatch> {
        self.entries.get(&Self::key(address)).map(LocationMatch::from)
    }

    /// Looks up a raw key, ignoring case.
    #[must_use]
    pub fn get_key(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(&key.to_lowercase())
    }

    pub fn insert(&mut self, address: &Address, location: &LocationMatch) {
        self.entries.insert(Self::key(address), CacheEntry::from(location));
    }

    /// Copies a cached location into `record`, marking it cached. Returns
    /// whether the address was in the cache.
    pub fn hydrate(&self, record: &mut SiteRecord) -> bool {
        match self.get(&record.address) {
            Some(location) => {
                record.mark_cached(location);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
