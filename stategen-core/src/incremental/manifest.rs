//! Build manifest format and persistence
//!
//! JSON on disk: `{version, lastUpdate, sourceFiles, generatedFiles}` with
//! one `{hash, mtime, size}` record per tracked path. Only hashes are
//! stored, never machine content.

use super::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

pub const MANIFEST_VERSION: &str = "1.0.0";

/// Hash/timestamp record for one tracked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Hex-encoded SHA-256 of the file contents
    pub hash: String,
    /// Modification time, epoch milliseconds
    pub mtime: i64,
    pub size: u64,
}

impl FileRecord {
    /// Build a record from a file on disk
    pub fn for_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let metadata = fs::metadata(path)?;
        Ok(Self { hash: hash_content(&bytes), mtime: mtime_millis(&metadata), size: metadata.len() })
    }
}

/// Persisted ledger of source and generated files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildManifest {
    pub version: String,
    /// Timestamp of the last successful commit, epoch milliseconds
    pub last_update: i64,
    pub source_files: HashMap<String, FileRecord>,
    pub generated_files: HashMap<String, FileRecord>,
}

impl Default for BuildManifest {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            last_update: 0,
            source_files: HashMap::new(),
            generated_files: HashMap::new(),
        }
    }
}

impl BuildManifest {
    /// Load a manifest; absence or parse failure yields the empty default.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(manifest) => manifest,
                Err(error) => {
                    tracing::warn!("Ignoring corrupt build manifest at {:?}: {}", path, error);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.source_files.is_empty() && self.generated_files.is_empty()
    }
}

/// Hex-encoded SHA-256 of a byte slice
pub fn hash_content(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Modification time as epoch milliseconds; files with unreadable
/// timestamps report 0
pub fn mtime_millis(metadata: &fs::Metadata) -> i64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_manifest_is_empty_default() {
        let manifest = BuildManifest::load(Path::new("/definitely/not/there.json"));
        assert_eq!(manifest.version, MANIFEST_VERSION);
        assert_eq!(manifest.last_update, 0);
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_corrupt_manifest_is_empty_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, "{not json").unwrap();
        let manifest = BuildManifest::load(&path);
        assert!(manifest.is_empty());
        assert_eq!(manifest.version, MANIFEST_VERSION);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/manifest.json");

        let mut manifest = BuildManifest::default();
        manifest.last_update = 1234;
        manifest.source_files.insert(
            "flows/top-up.md".to_string(),
            FileRecord { hash: "abc".to_string(), mtime: 99, size: 10 },
        );
        manifest.save(&path).unwrap();

        let loaded = BuildManifest::load(&path);
        assert_eq!(loaded.last_update, 1234);
        assert_eq!(loaded.source_files["flows/top-up.md"].hash, "abc");
    }

    #[test]
    fn test_wire_format_keys() {
        let manifest = BuildManifest::default();
        let json = serde_json::to_string(&manifest).unwrap();
        assert!(json.contains("\"lastUpdate\""));
        assert!(json.contains("\"sourceFiles\""));
        assert!(json.contains("\"generatedFiles\""));
    }

    #[test]
    fn test_partial_manifest_fills_defaults() {
        let manifest: BuildManifest = serde_json::from_str("{\"version\":\"1.0.0\"}").unwrap();
        assert_eq!(manifest.last_update, 0);
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_hash_content_is_stable() {
        let first = hash_content(b"flowchart TD");
        let second = hash_content(b"flowchart TD");
        assert_eq!(first, second);
        assert_ne!(first, hash_content(b"flowchart LR"));
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_file_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("diagram.md");
        fs::write(&path, "flowchart TD\nA-->B").unwrap();
        let record = FileRecord::for_path(&path).unwrap();
        assert_eq!(record.size, 18);
        assert!(record.mtime > 0);
    }
}
