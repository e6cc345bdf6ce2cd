//! Add / update / delete for any catalog entity type, single and batched.

use larder_core::{DomainError, DomainResult, Entity};
use larder_history::Command;

use crate::store::sealed::Table;
use crate::store::{CatalogStore, Stored};

fn not_found<E: Stored>(id: &E::Id) -> DomainError {
    DomainError::not_found(format!("{} {id}", E::KIND))
}

fn already_exists<E: Stored>(id: &E::Id) -> DomainError {
    DomainError::conflict(format!("{} {id} already exists", E::KIND))
}

/// Insert a new entity. Undo removes it again.
#[derive(Debug, Clone)]
pub struct AddEntity<E: Stored> {
    entity: E,
    description: String,
}

impl<E: Stored> AddEntity<E> {
    /// Validates the entity and its references and fills in derived fields.
    pub fn new(store: &CatalogStore, mut entity: E) -> DomainResult<Self> {
        entity.validate()?;
        if store.contains::<E>(entity.id()) {
            return Err(already_exists::<E>(entity.id()));
        }
        entity.check_references(store)?;
        entity.refresh_derived(store)?;

        let description = format!("Add {} {}", E::KIND, entity.id());
        Ok(Self {
            entity,
            description,
        })
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }
}

impl<E: Stored> Command<CatalogStore> for AddEntity<E> {
    fn execute(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        let id = self.entity.id();
        if store.contains::<E>(id) {
            return Err(already_exists::<E>(id));
        }
        E::table_mut(store).insert(id.clone(), self.entity.clone());
        Ok(())
    }

    fn undo(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        E::table_mut(store)
            .remove(self.entity.id())
            .map(|_| ())
            .ok_or_else(|| not_found::<E>(self.entity.id()))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Replace an entity with an edited version. Undo reinstalls the pre-image.
///
/// Only the editable fields come from the edit. Stock levels and sales
/// counters belong to the stock and order commands, so each execution takes
/// them from the entity as stored at that moment, and the pre-image is
/// captured then too.
#[derive(Debug, Clone)]
pub struct UpdateEntity<E: Stored> {
    before: E,
    after: E,
    description: String,
}

impl<E: Stored> UpdateEntity<E> {
    /// `after` carries the id of the entity to replace.
    pub fn new(store: &CatalogStore, mut after: E) -> DomainResult<Self> {
        let before = store
            .get::<E>(after.id())
            .cloned()
            .ok_or_else(|| not_found::<E>(after.id()))?;
        after.validate()?;
        after.adopt_owned_fields(&before);
        after.check_references(store)?;
        after.refresh_derived(store)?;

        let description = format!("Update {} {}", E::KIND, after.id());
        Ok(Self {
            before,
            after,
            description,
        })
    }

    pub fn before(&self) -> &E {
        &self.before
    }

    pub fn after(&self) -> &E {
        &self.after
    }

    fn install(store: &mut CatalogStore, image: &E) -> DomainResult<()> {
        match E::table_mut(store).get_mut(image.id()) {
            Some(slot) => {
                *slot = image.clone();
                Ok(())
            }
            None => Err(not_found::<E>(image.id())),
        }
    }
}

impl<E: Stored> Command<CatalogStore> for UpdateEntity<E> {
    fn execute(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        let id = self.after.id();
        let current = store
            .get::<E>(id)
            .cloned()
            .ok_or_else(|| not_found::<E>(id))?;

        let mut image = self.after.clone();
        image.adopt_owned_fields(&current);
        image.check_references(store)?;
        image.refresh_derived(store)?;

        Self::install(store, &image)?;
        self.before = current;
        self.after = image;
        Ok(())
    }

    fn undo(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        let id = self.after.id();
        match store.get::<E>(id).map(|current| *current == self.after) {
            Some(true) => Self::install(store, &self.before),
            Some(false) => Err(DomainError::invariant(format!(
                "{} {id} changed after it was updated",
                E::KIND
            ))),
            None => Err(not_found::<E>(id)),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Remove an entity nothing else refers to. Undo reinserts it unchanged.
#[derive(Debug, Clone)]
pub struct DeleteEntity<E: Stored> {
    removed: E,
    description: String,
}

impl<E: Stored> DeleteEntity<E> {
    pub fn new(store: &CatalogStore, id: &E::Id) -> DomainResult<Self> {
        let removed = store
            .get::<E>(id)
            .cloned()
            .ok_or_else(|| not_found::<E>(id))?;
        E::check_unreferenced(id, store)?;

        Ok(Self {
            removed,
            description: format!("Delete {} {id}", E::KIND),
        })
    }

    pub fn removed(&self) -> &E {
        &self.removed
    }
}

impl<E: Stored> Command<CatalogStore> for DeleteEntity<E> {
    fn execute(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        E::table_mut(store)
            .remove(self.removed.id())
            .map(|_| ())
            .ok_or_else(|| not_found::<E>(self.removed.id()))
    }

    fn undo(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        let id = self.removed.id();
        if store.contains::<E>(id) {
            return Err(already_exists::<E>(id));
        }
        E::table_mut(store).insert(id.clone(), self.removed.clone());
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Insert several entities of one type as a single step, in the given order.
#[derive(Debug, Clone)]
pub struct BatchAdd<E: Stored> {
    entities: Vec<E>,
    description: String,
}

impl<E: Stored> BatchAdd<E> {
    pub fn new(store: &CatalogStore, entities: Vec<E>) -> DomainResult<Self> {
        if entities.is_empty() {
            return Err(DomainError::validation(format!(
                "no {} to add",
                E::KIND
            )));
        }

        let mut prepared: Vec<E> = Vec::with_capacity(entities.len());
        for mut entity in entities {
            entity.validate()?;
            if store.contains::<E>(entity.id()) || prepared.iter().any(|p| p.id() == entity.id()) {
                return Err(already_exists::<E>(entity.id()));
            }
            entity.check_references(store)?;
            entity.refresh_derived(store)?;
            prepared.push(entity);
        }

        let description = format!("Add {} {}(s)", prepared.len(), E::KIND);
        Ok(Self {
            entities: prepared,
            description,
        })
    }

    pub fn entities(&self) -> &[E] {
        &self.entities
    }
}

impl<E: Stored> Command<CatalogStore> for BatchAdd<E> {
    fn execute(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        if let Some(clash) = self.entities.iter().find(|e| store.contains::<E>(e.id())) {
            return Err(already_exists::<E>(clash.id()));
        }
        let table = E::table_mut(store);
        for entity in &self.entities {
            table.insert(entity.id().clone(), entity.clone());
        }
        Ok(())
    }

    fn undo(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        if let Some(missing) = self.entities.iter().find(|e| !store.contains::<E>(e.id())) {
            return Err(not_found::<E>(missing.id()));
        }
        let table = E::table_mut(store);
        for entity in self.entities.iter().rev() {
            table.remove(entity.id());
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Remove several entities of one type as a single step.
#[derive(Debug, Clone)]
pub struct BatchDelete<E: Stored> {
    removed: Vec<E>,
    description: String,
}

impl<E: Stored> BatchDelete<E> {
    pub fn new(store: &CatalogStore, ids: &[E::Id]) -> DomainResult<Self> {
        if ids.is_empty() {
            return Err(DomainError::validation(format!(
                "no {} to delete",
                E::KIND
            )));
        }

        let mut removed: Vec<E> = Vec::with_capacity(ids.len());
        for id in ids {
            if removed.iter().any(|r| r.id() == id) {
                return Err(DomainError::validation(format!(
                    "{} {id} listed twice",
                    E::KIND
                )));
            }
            let entity = store.get::<E>(id).cloned().ok_or_else(|| not_found::<E>(id))?;
            E::check_unreferenced(id, store)?;
            removed.push(entity);
        }

        let description = format!("Delete {} {}(s)", removed.len(), E::KIND);
        Ok(Self {
            removed,
            description,
        })
    }

    pub fn removed(&self) -> &[E] {
        &self.removed
    }
}

impl<E: Stored> Command<CatalogStore> for BatchDelete<E> {
    fn execute(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        if let Some(missing) = self.removed.iter().find(|e| !store.contains::<E>(e.id())) {
            return Err(not_found::<E>(missing.id()));
        }
        let table = E::table_mut(store);
        for entity in &self.removed {
            table.remove(entity.id());
        }
        Ok(())
    }

    fn undo(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        if let Some(clash) = self.removed.iter().find(|e| store.contains::<E>(e.id())) {
            return Err(already_exists::<E>(clash.id()));
        }
        let table = E::table_mut(store);
        for entity in &self.removed {
            table.insert(entity.id().clone(), entity.clone());
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
