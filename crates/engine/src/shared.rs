//! A kitchen shared between threads.
//!
//! One mutex guards the whole kitchen, so every execute, undo and redo runs as
//! a single critical section.

use std::sync::{Arc, Mutex, MutexGuard};

use larder_catalog::CatalogStore;
use larder_core::{DomainError, DomainResult};
use larder_history::Command;

use crate::kitchen::Kitchen;

#[derive(Debug, Clone)]
pub struct SharedKitchen {
    inner: Arc<Mutex<Kitchen>>,
}

impl SharedKitchen {
    pub fn new(kitchen: Kitchen) -> Self {
        Self {
            inner: Arc::new(Mutex::new(kitchen)),
        }
    }

    fn lock(&self) -> DomainResult<MutexGuard<'_, Kitchen>> {
        self.inner
            .lock()
            .map_err(|_| DomainError::invariant("kitchen lock poisoned"))
    }

    pub fn execute(&self, command: impl Command<CatalogStore> + 'static) -> DomainResult<()> {
        self.lock()?.execute(command)
    }

    pub fn undo(&self) -> DomainResult<Option<String>> {
        self.lock()?.undo()
    }

    pub fn redo(&self) -> DomainResult<Option<String>> {
        self.lock()?.redo()
    }

    /// Run `f` with the kitchen locked, for reads and for building commands
    /// against a consistent view.
    pub fn with<T>(&self, f: impl FnOnce(&mut Kitchen) -> T) -> DomainResult<T> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }
}
