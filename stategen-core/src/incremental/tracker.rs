//! Change detection and commit over the build manifest

use super::manifest::{BuildManifest, FileRecord, mtime_millis};
use super::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Categorized outcome of a change scan
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub added: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    pub has_changes: bool,
}

/// Tracks source and generated files across compile runs
#[derive(Debug)]
pub struct ChangeTracker {
    manifest_path: PathBuf,
    manifest: BuildManifest,
}

impl ChangeTracker {
    /// Load the tracker from a manifest path; a missing or corrupt
    /// manifest starts empty.
    pub fn load(manifest_path: impl Into<PathBuf>) -> Self {
        let manifest_path = manifest_path.into();
        let manifest = BuildManifest::load(&manifest_path);
        Self { manifest_path, manifest }
    }

    pub fn manifest(&self) -> &BuildManifest {
        &self.manifest
    }

    /// Categorize the given source paths against the manifest: absent
    /// record means added, differing hash or mtime means modified, and
    /// tracked paths no longer passed in are deleted.
    pub fn detect_changes(&self, sources: &[PathBuf]) -> Result<ChangeSet> {
        let mut changes = ChangeSet::default();

        for path in sources {
            let key = manifest_key(path);
            let current = FileRecord::for_path(path)?;
            match self.manifest.source_files.get(&key) {
                None => changes.added.push(path.clone()),
                Some(record) if record.hash != current.hash || record.mtime != current.mtime => {
                    changes.modified.push(path.clone())
                }
                Some(_) => {}
            }
        }

        let current_keys: Vec<String> = sources.iter().map(|p| manifest_key(p)).collect();
        for tracked in self.manifest.source_files.keys() {
            if !current_keys.iter().any(|k| k == tracked) {
                changes.deleted.push(PathBuf::from(tracked));
            }
        }
        changes.deleted.sort();

        changes.has_changes =
            !(changes.added.is_empty() && changes.modified.is_empty() && changes.deleted.is_empty());
        Ok(changes)
    }

    /// Cheap freshness check: false when any source was modified after the
    /// last commit, when a source is untracked or unreadable, or when a
    /// tracked generated file no longer exists on disk.
    pub fn is_up_to_date(&self, sources: &[PathBuf]) -> bool {
        if self.manifest.last_update == 0 {
            return false;
        }

        for path in sources {
            if !self.manifest.source_files.contains_key(&manifest_key(path)) {
                return false;
            }
            match fs::metadata(path) {
                Ok(metadata) => {
                    if mtime_millis(&metadata) > self.manifest.last_update {
                        return false;
                    }
                }
                Err(_) => return false,
            }
        }

        for generated in self.manifest.generated_files.keys() {
            if !Path::new(generated).exists() {
                return false;
            }
        }

        true
    }

    /// Record a successful emission: the source section is replaced
    /// wholesale, generated entries are merged, and the manifest persists
    /// with a fresh build timestamp.
    pub fn commit(&mut self, sources: &[PathBuf], generated: &[PathBuf]) -> Result<()> {
        self.manifest.source_files.clear();
        for path in sources {
            self.manifest.source_files.insert(manifest_key(path), FileRecord::for_path(path)?);
        }

        for path in generated {
            self.manifest.generated_files.insert(manifest_key(path), FileRecord::for_path(path)?);
        }

        self.manifest.last_update = chrono::Utc::now().timestamp_millis();
        self.manifest.save(&self.manifest_path)?;
        Ok(())
    }
}

fn manifest_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
