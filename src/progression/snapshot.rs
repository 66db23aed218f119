//! Progression snapshots and where they are stored.
//!
//! The snapshot is plain JSON with a schema version. Stores only move strings
//! around; parsing, version checks and fallbacks happen in the ledger.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::achievements::AchievementProgress;
use super::{CombatStatistics, ProgressionState};

/// Current snapshot schema
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionSnapshot {
    pub statistics: CombatStatistics,
    pub achievements: Vec<AchievementProgress>,
    pub progression: ProgressionState,
    /// Unix seconds
    pub last_save_date: u64,
    pub version: u32,
}

impl ProgressionSnapshot {
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize progression: {}", e))
    }

    /// Parse and check the schema version
    pub fn from_json(contents: &str) -> Result<Self, String> {
        let snapshot: ProgressionSnapshot = serde_json::from_str(contents)
            .map_err(|e| format!("Failed to parse progression snapshot: {}", e))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(format!(
                "Unsupported progression snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            ));
        }
        Ok(snapshot)
    }
}

/// Storage medium for serialized snapshots.
///
/// `read` returns `Ok(None)` when nothing has been saved yet.
pub trait SnapshotStore: Send + Sync {
    fn read(&self) -> Result<Option<String>, String>;

    fn write(&self, contents: &str) -> Result<(), String>;
}

/// Snapshot kept in a JSON file
#[derive(Clone, Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read(&self) -> Result<Option<String>, String> {
        if !self.path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|e| format!("Failed to read {}: {}", self.path.display(), e))
    }

    fn write(&self, contents: &str) -> Result<(), String> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        // Write to a sibling first so a crash mid-write never truncates the old save.
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, contents)
            .map_err(|e| format!("Failed to write {}: {}", staging.display(), e))?;
        std::fs::rename(&staging, &self.path)
            .map_err(|e| format!("Failed to replace {}: {}", self.path.display(), e))
    }
}

/// In-memory store. Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemorySnapshotStore {
    slot: Arc<Mutex<Option<String>>>,
    fail_writes: bool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(contents.into()))),
            fail_writes: false,
        }
    }

    /// A store whose writes always fail, for exercising retry paths
    pub fn failing() -> Self {
        Self {
            slot: Arc::default(),
            fail_writes: true,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn read(&self) -> Result<Option<String>, String> {
        self.slot
            .lock()
            .map(|slot| slot.clone())
            .map_err(|_| "Snapshot store lock poisoned".to_string())
    }

    fn write(&self, contents: &str) -> Result<(), String> {
        if self.fail_writes {
            return Err("Snapshot store is unavailable".to_string());
        }
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| "Snapshot store lock poisoned".to_string())?;
        *slot = Some(contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_clones_share_contents() {
        let store = MemorySnapshotStore::new();
        let clone = store.clone();

        store.write("{}").expect("write should succeed");
        assert_eq!(clone.read().expect("read should succeed"), Some("{}".to_string()));
    }

    #[test]
    fn test_failing_store_rejects_writes() {
        let store = MemorySnapshotStore::failing();
        assert!(store.write("{}").is_err());
        assert_eq!(store.contents(), None);
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let store = FileSnapshotStore::new("no/such/profile.json");
        assert_eq!(store.read(), Ok(None));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("mechduel-store-{}", std::process::id()));
        let store = FileSnapshotStore::new(dir.join("profile.json"));

        store.write("{\"version\":1}").expect("write should succeed");
        assert_eq!(store.read(), Ok(Some("{\"version\":1}".to_string())));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_wrong_version_rejected() {
        let json = r#"{
            "statistics": {},
            "achievements": [],
            "progression": {},
            "lastSaveDate": 0,
            "version": 2
        }"#;
        let err = ProgressionSnapshot::from_json(json).expect_err("future version must be rejected");
        assert!(err.contains("version 2"));
    }
}
