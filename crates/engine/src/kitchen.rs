use std::sync::Arc;

use anyhow::{Context, anyhow};
use tracing::info;

use larder_catalog::{CatalogSnapshot, CatalogStore, Ingredient, fulfillment};
use larder_core::{ComboId, DishId, DomainResult};
use larder_history::{AuditSink, Command, HistoryManager};
use larder_observability::TracingAuditSink;

use crate::config::EngineConfig;
use crate::persistence::SnapshotStore;

/// One catalog and the history of commands run against it.
///
/// All mutation goes through [`Kitchen::execute`], [`Kitchen::undo`] and
/// [`Kitchen::redo`], or through a wholesale snapshot restore, which also
/// forgets history.
#[derive(Debug)]
pub struct Kitchen {
    store: CatalogStore,
    history: HistoryManager<CatalogStore>,
    config: EngineConfig,
}

impl Default for Kitchen {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Kitchen {
    /// An empty kitchen.
    pub fn new(config: EngineConfig) -> Self {
        Self::from_store(CatalogStore::new(), config)
    }

    pub fn from_store(store: CatalogStore, config: EngineConfig) -> Self {
        let mut history = HistoryManager::new(config.history());
        if config.trace_audit {
            history.add_sink(Arc::new(TracingAuditSink::new()));
        }
        Self {
            store,
            history,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register an additional audit sink.
    pub fn add_sink(&mut self, sink: Arc<dyn AuditSink>) {
        self.history.add_sink(sink);
    }

    /// Run `command` and record it for undo.
    ///
    /// A failing command leaves both the catalog and the history unchanged.
    pub fn execute(&mut self, command: impl Command<CatalogStore> + 'static) -> DomainResult<()> {
        self.history.execute(&mut self.store, Box::new(command))
    }

    /// Undo the most recent command, returning its description, or `None`
    /// when there was nothing to undo.
    pub fn undo(&mut self) -> DomainResult<Option<String>> {
        self.history.undo(&mut self.store)
    }

    /// Redo the most recently undone command, returning its description, or
    /// `None` when there was nothing to redo.
    pub fn redo(&mut self) -> DomainResult<Option<String>> {
        self.history.redo(&mut self.store)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo history, most recent first.
    pub fn describe_undo_history(&self) -> Vec<String> {
        self.history
            .undo_descriptions()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Redo history, most recent first.
    pub fn describe_redo_history(&self) -> Vec<String> {
        self.history
            .redo_descriptions()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Read access to the catalog.
    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// One serving of the dish can be made now. Unknown dishes are not.
    pub fn is_dish_fulfillable(&self, id: &DishId) -> bool {
        self.store
            .dish(id)
            .is_some_and(|dish| fulfillment::is_dish_fulfillable(&self.store, dish))
    }

    /// One of the combo can be made now. Unknown combos are not.
    pub fn is_combo_fulfillable(&self, id: &ComboId) -> bool {
        self.store
            .combo(id)
            .is_some_and(|combo| fulfillment::is_combo_fulfillable(&self.store, combo))
    }

    pub fn low_stock(&self) -> Vec<&Ingredient> {
        self.store.low_stock_ingredients()
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.store.snapshot()
    }

    /// Replace the whole catalog and clear history.
    pub fn restore(&mut self, snapshot: CatalogSnapshot) -> DomainResult<()> {
        self.store = CatalogStore::from_snapshot(snapshot)?;
        self.history.clear();
        Ok(())
    }

    pub fn save_to(&self, target: &dyn SnapshotStore) -> anyhow::Result<()> {
        target
            .save(&self.snapshot())
            .context("saving kitchen snapshot")?;
        info!(
            ingredients = self.store.ingredients().count(),
            orders = self.store.orders().count(),
            "kitchen saved"
        );
        Ok(())
    }

    /// Restore from the latest snapshot in `source`. History is cleared.
    pub fn load_from(&mut self, source: &dyn SnapshotStore) -> anyhow::Result<()> {
        let snapshot = source
            .load()
            .context("loading kitchen snapshot")?
            .ok_or_else(|| anyhow!("no kitchen snapshot has been saved"))?;
        self.restore(snapshot).context("restoring kitchen snapshot")?;
        info!(
            ingredients = self.store.ingredients().count(),
            orders = self.store.orders().count(),
            "kitchen loaded"
        );
        Ok(())
    }
}
