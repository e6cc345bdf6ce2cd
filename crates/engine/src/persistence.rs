//! Snapshot persistence seam.
//!
//! The engine never persists on its own; callers save and load whole-catalog
//! snapshots around their own units of work.

use std::sync::RwLock;

use anyhow::{Context, anyhow};

use larder_catalog::CatalogSnapshot;

/// Storage for one catalog snapshot.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, snapshot: &CatalogSnapshot) -> anyhow::Result<()>;

    /// The most recently saved snapshot, if any.
    fn load(&self) -> anyhow::Result<Option<CatalogSnapshot>>;
}

/// Keeps the latest snapshot as a JSON document in memory.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    document: RwLock<Option<String>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored JSON document, if any.
    pub fn document(&self) -> anyhow::Result<Option<String>> {
        let guard = self
            .document
            .read()
            .map_err(|_| anyhow!("snapshot store lock poisoned"))?;
        Ok(guard.clone())
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn save(&self, snapshot: &CatalogSnapshot) -> anyhow::Result<()> {
        let json = serde_json::to_string(snapshot).context("serializing catalog snapshot")?;
        let mut guard = self
            .document
            .write()
            .map_err(|_| anyhow!("snapshot store lock poisoned"))?;
        *guard = Some(json);
        Ok(())
    }

    fn load(&self) -> anyhow::Result<Option<CatalogSnapshot>> {
        let guard = self
            .document
            .read()
            .map_err(|_| anyhow!("snapshot store lock poisoned"))?;
        guard
            .as_deref()
            .map(|json| serde_json::from_str(json).context("deserializing catalog snapshot"))
            .transpose()
    }
}
