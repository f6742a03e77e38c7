//! Snapshot persistence backends.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use proplay_types::{Result, Snapshot};

/// Where a session keeps its state between runs.
///
/// The whole state is rewritten on every save; there are no partial
/// updates.
pub trait SnapshotStore {
    /// The last saved snapshot, or `None` on first start.
    fn load(&self) -> Result<Option<Snapshot>>;

    /// Replace the stored snapshot.
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// Keeps the snapshot in memory. Lost when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    snapshot: Option<Snapshot>,
    saves: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            saves: 0,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Number of successful saves.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.snapshot = Some(snapshot.clone());
        self.saves += 1;
        Ok(())
    }
}

/// Pretty-printed JSON in a single file.
///
/// Saves go to a sibling `.tmp` file which is then renamed over the target,
/// so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        Snapshot::from_json(&json).map(Some)
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        tracing::debug!(path = %self.path.display(), bytes = json.len(), "Snapshot written");
        Ok(())
    }
}
