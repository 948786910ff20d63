//! Player data persisted as a pretty-printed JSON file.
//!
//! The whole store is rewritten after every mutation. Writes go to a sibling
//! temporary file first and are renamed into place.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};
use yatpa_core::{normalize, ActorId, MemoryPlayerStore, PlayerRecord, PlayerStore, Position, StoreData, StoreError};

pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryPlayerStore,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Loads the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let data: StoreData = serde_json::from_str(&content)?;
            info!(
                "💾 Loaded {} player record(s) and {} offline location(s) from {}",
                data.players.len(),
                data.offline.len(),
                path.display()
            );
            data
        } else {
            info!("💾 No player data at {}, starting empty", path.display());
            StoreData::default()
        };

        Ok(Self { path, inner: MemoryPlayerStore::with_data(data), write_lock: Mutex::new(()) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> StoreData {
        self.inner.snapshot()
    }

    /// Writes the current contents to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.write(&self.inner.snapshot())
    }

    fn write(&self, data: &StoreData) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(data)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;

        debug!("💾 Player data written to {}", self.path.display());
        Ok(())
    }

    /// Writes `data` with one change applied, then applies the same change in
    /// memory. A failed write leaves memory untouched.
    fn persist_then(
        &self,
        change: impl FnOnce(&mut StoreData),
        commit: impl FnOnce(&MemoryPlayerStore) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut candidate = self.inner.snapshot();
        change(&mut candidate);
        self.write(&candidate)
            .inspect_err(|e| warn!("❌ Failed to persist player data: {}", e))?;
        commit(&self.inner)
    }
}

impl PlayerStore for JsonFileStore {
    fn player(&self, actor: ActorId) -> PlayerRecord {
        self.inner.player(actor)
    }

    fn save_player(&self, actor: ActorId, record: PlayerRecord) -> Result<(), StoreError> {
        let staged = record.clone();
        self.persist_then(
            |data| {
                data.players.insert(actor, staged);
            },
            |inner| inner.save_player(actor, record),
        )
    }

    fn offline_location(&self, name: &str) -> Option<Position> {
        self.inner.offline_location(name)
    }

    fn set_offline_location(&self, name: &str, position: Position) -> Result<(), StoreError> {
        let staged = position.clone();
        self.persist_then(
            |data| {
                data.offline.insert(normalize(name), staged);
            },
            |inner| inner.set_offline_location(name, position),
        )
    }
}
