// ============================================================================
// clipsmith-core/src/cache.rs
// ============================================================================
//
// METADATA CACHE: Per-folder YAML cache of probed video metadata
//
// Each folder keeps its own `.clipsmith_cache.yaml`, keyed by file name. An
// entry is reused only while the file's modification time and size match.
// Files with an unknown schema version, or that fail to parse, are discarded
// and rebuilt rather than misread.

use crate::config::{CACHE_FILENAME, CACHE_SCHEMA_VERSION};
use crate::error::CoreResult;
use crate::media::{FrameRate, Resolution, VideoMetadata};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Freshness stamp of a file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: DateTime<Utc>,
    pub size: u64,
}

impl FileStamp {
    /// Reads the stamp of `path` from the file system.
    pub fn of(path: &Path) -> CoreResult<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            modified: DateTime::<Utc>::from(meta.modified()?),
            size: meta.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CacheEntry {
    filename: String,
    modified: DateTime<Utc>,
    size: u64,
    valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resolution: Option<Resolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    frame_rate: Option<FrameRate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    has_audio: Option<bool>,
}

impl CacheEntry {
    fn new(filename: &str, stamp: FileStamp, metadata: &VideoMetadata) -> Self {
        Self {
            filename: filename.to_string(),
            modified: stamp.modified,
            size: stamp.size,
            valid: metadata.valid,
            duration: metadata.duration,
            resolution: metadata.resolution,
            codec: metadata.codec.clone(),
            frame_rate: metadata.frame_rate,
            has_audio: metadata.has_audio,
        }
    }

    fn metadata(&self) -> VideoMetadata {
        VideoMetadata {
            duration: self.duration,
            resolution: self.resolution,
            codec: self.codec.clone(),
            frame_rate: self.frame_rate,
            has_audio: self.has_audio,
            valid: self.valid,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    #[serde(default)]
    videos: Vec<CacheEntry>,
}

/// Only the version, so that a newer schema is recognized before parsing it.
#[derive(Debug, Deserialize)]
struct CacheVersion {
    version: Option<u32>,
}

/// The metadata cache of one folder.
#[derive(Debug)]
pub struct MetadataCache {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
    existed: bool,
    dirty: bool,
}

impl MetadataCache {
    /// Loads the cache of `folder`, starting empty if there is none or it is unusable.
    #[must_use]
    pub fn load(folder: &Path) -> Self {
        let path = folder.join(CACHE_FILENAME);
        let mut cache = Self {
            path,
            entries: BTreeMap::new(),
            existed: false,
            dirty: false,
        };

        let text = match fs::read_to_string(&cache.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return cache,
            Err(e) => {
                warn!("Cannot read cache {}: {}; rebuilding", cache.path.display(), e);
                cache.existed = true;
                cache.dirty = true;
                return cache;
            }
        };
        cache.existed = true;

        match parse_cache(&text) {
            Ok(entries) => {
                debug!("Loaded {} cache entries from {}", entries.len(), cache.path.display());
                cache.entries = entries;
            }
            Err(reason) => {
                warn!("Discarding cache {}: {}; rebuilding", cache.path.display(), reason);
                cache.dirty = true;
            }
        }
        cache
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached metadata for `filename` if its stamp still matches.
    #[must_use]
    pub fn lookup(&self, filename: &str, stamp: FileStamp) -> Option<VideoMetadata> {
        self.entries
            .get(filename)
            .filter(|e| e.modified == stamp.modified && e.size == stamp.size)
            .map(CacheEntry::metadata)
    }

    /// Records freshly probed metadata for `filename`.
    pub fn update(&mut self, filename: &str, stamp: FileStamp, metadata: &VideoMetadata) {
        let entry = CacheEntry::new(filename, stamp, metadata);
        if self.entries.get(filename) != Some(&entry) {
            self.entries.insert(filename.to_string(), entry);
            self.dirty = true;
        }
    }

    /// Drops entries for files that are no longer present.
    pub fn retain(&mut self, present: &BTreeSet<String>) {
        let before = self.entries.len();
        self.entries.retain(|name, _| present.contains(name));
        if self.entries.len() != before {
            self.dirty = true;
        }
    }

    /// Whether saving would write the file.
    #[must_use]
    pub fn needs_write(&self) -> bool {
        self.dirty || !self.existed
    }

    /// Writes the cache if it did not exist or anything changed.
    /// Returns whether the file was written.
    pub fn save_if_changed(&mut self) -> CoreResult<bool> {
        if !self.needs_write() {
            return Ok(false);
        }

        let file = CacheFile {
            version: CACHE_SCHEMA_VERSION,
            videos: self.entries.values().cloned().collect(),
        };
        fs::write(&self.path, serde_yaml::to_string(&file)?)?;
        debug!("Wrote {} cache entries to {}", file.videos.len(), self.path.display());

        self.existed = true;
        self.dirty = false;
        Ok(true)
    }
}

fn parse_cache(text: &str) -> Result<BTreeMap<String, CacheEntry>, String> {
    let version = serde_yaml::from_str::<CacheVersion>(text)
        .map_err(|e| e.to_string())?
        .version;
    if version != Some(CACHE_SCHEMA_VERSION) {
        return Err(match version {
            Some(v) => format!("schema version {v} is not {CACHE_SCHEMA_VERSION}"),
            None => "missing schema version".to_string(),
        });
    }

    let file: CacheFile = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
    Ok(file
        .videos
        .into_iter()
        .map(|entry| (entry.filename.clone(), entry))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(size: u64) -> FileStamp {
        FileStamp {
            modified: DateTime::parse_from_rfc3339("2024-01-01T00:00:00.123456789Z")
                .unwrap()
                .with_timezone(&Utc),
            size,
        }
    }

    fn metadata() -> VideoMetadata {
        VideoMetadata {
            duration: Some(12.5),
            resolution: Some(Resolution::new(1920, 1080)),
            codec: Some("h264".to_string()),
            frame_rate: Some(FrameRate { num: 30000, den: 1001 }),
            has_audio: Some(true),
            valid: true,
        }
    }

    #[test]
    fn test_new_cache_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = MetadataCache::load(dir.path());
        assert!(cache.is_empty());
        cache.update("a.mp4", stamp(10), &metadata());
        assert!(cache.save_if_changed().unwrap());
        assert!(!cache.save_if_changed().unwrap());

        let reloaded = MetadataCache::load(dir.path());
        assert_eq!(reloaded.lookup("a.mp4", stamp(10)), Some(metadata()));
        assert_eq!(reloaded.lookup("a.mp4", stamp(11)), None);
        assert!(!reloaded.needs_write());
    }

    #[test]
    fn test_unchanged_update_is_not_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = MetadataCache::load(dir.path());
        cache.update("a.mp4", stamp(10), &metadata());
        cache.save_if_changed().unwrap();

        let mut cache = MetadataCache::load(dir.path());
        cache.update("a.mp4", stamp(10), &metadata());
        cache.retain(&BTreeSet::from(["a.mp4".to_string()]));
        assert!(!cache.needs_write());

        cache.retain(&BTreeSet::new());
        assert!(cache.needs_write());
    }

    #[test]
    fn test_schema_version_mismatch_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CACHE_FILENAME),
            "version: 99\nvideos:\n  - filename: a.mp4\n",
        )
        .unwrap();
        let cache = MetadataCache::load(dir.path());
        assert!(cache.is_empty());
        assert!(cache.needs_write());
    }

    #[test]
    fn test_garbage_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CACHE_FILENAME), ":: not yaml [").unwrap();
        let cache = MetadataCache::load(dir.path());
        assert!(cache.is_empty());
        assert!(cache.needs_write());
    }

    #[test]
    fn test_yaml_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = MetadataCache::load(dir.path());
        cache.update("a.mp4", stamp(1048576), &metadata());
        cache.save_if_changed().unwrap();

        let text = fs::read_to_string(dir.path().join(CACHE_FILENAME)).unwrap();
        assert!(text.starts_with("version: 1\n"));
        assert!(text.contains("filename: a.mp4"));
        assert!(text.contains("size: 1048576"));
        assert!(text.contains("codec: h264"));
        assert!(text.contains("has_audio: true"));
    }

    #[test]
    fn test_entries_without_audio_field_load_as_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = MetadataCache::load(dir.path());
        let mut older = metadata();
        older.has_audio = None;
        cache.update("a.mp4", stamp(10), &older);
        cache.save_if_changed().unwrap();

        let text = fs::read_to_string(dir.path().join(CACHE_FILENAME)).unwrap();
        assert!(!text.contains("has_audio"));
        let reloaded = MetadataCache::load(dir.path());
        assert_eq!(
            reloaded.lookup("a.mp4", stamp(10)).map(|m| m.has_audio),
            Some(None)
        );
    }
}
