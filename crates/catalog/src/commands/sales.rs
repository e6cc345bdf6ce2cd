use std::collections::BTreeMap;

use larder_core::{ComboId, DishId, DomainError, DomainResult};

use crate::order::{ItemRef, OrderItem};
use crate::store::CatalogStore;

/// Sales counter increments implied by a set of order lines.
///
/// A combo line counts toward the combo only, not its member dishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SalesTally {
    dishes: BTreeMap<DishId, u64>,
    combos: BTreeMap<ComboId, u64>,
}

impl SalesTally {
    pub(crate) fn of(items: &[OrderItem]) -> Self {
        let mut tally = Self::default();
        for item in items {
            let quantity = u64::from(item.quantity());
            match item.item() {
                ItemRef::Dish(id) => *tally.dishes.entry(id.clone()).or_default() += quantity,
                ItemRef::Combo(id) => *tally.combos.entry(id.clone()).or_default() += quantity,
            }
        }
        tally
    }

    /// The part of this tally whose dish or combo is still in `store`.
    pub(crate) fn present_in(&self, store: &CatalogStore) -> Self {
        Self {
            dishes: self
                .dishes
                .iter()
                .filter(|(id, _)| store.dish(id).is_some())
                .map(|(id, quantity)| (id.clone(), *quantity))
                .collect(),
            combos: self
                .combos
                .iter()
                .filter(|(id, _)| store.combo(id).is_some())
                .map(|(id, quantity)| (id.clone(), *quantity))
                .collect(),
        }
    }

    /// Every counted dish and combo exists.
    pub(crate) fn check_present(&self, store: &CatalogStore) -> DomainResult<()> {
        for id in self.dishes.keys() {
            if store.dish(id).is_none() {
                return Err(DomainError::not_found(format!("dish {id}")));
            }
        }
        for id in self.combos.keys() {
            if store.combo(id).is_none() {
                return Err(DomainError::not_found(format!("combo {id}")));
            }
        }
        Ok(())
    }

    /// Every counter is present and at least as large as the amount to take off.
    pub(crate) fn check_reversible(&self, store: &CatalogStore) -> DomainResult<()> {
        for (id, quantity) in &self.dishes {
            let count = store
                .dish(id)
                .map(|d| d.sales_count())
                .ok_or_else(|| DomainError::invariant(format!("dish {id} disappeared")))?;
            if count < *quantity {
                return Err(DomainError::invariant(format!(
                    "sales count of dish {id} is {count}, cannot take off {quantity}"
                )));
            }
        }
        for (id, quantity) in &self.combos {
            let count = store
                .combo(id)
                .map(|c| c.sales_count())
                .ok_or_else(|| DomainError::invariant(format!("combo {id} disappeared")))?;
            if count < *quantity {
                return Err(DomainError::invariant(format!(
                    "sales count of combo {id} is {count}, cannot take off {quantity}"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn record(&self, store: &mut CatalogStore) {
        for (id, quantity) in &self.dishes {
            if let Some(dish) = store.dish_mut(id) {
                dish.record_sales(*quantity);
            }
        }
        for (id, quantity) in &self.combos {
            if let Some(combo) = store.combo_mut(id) {
                combo.record_sales(*quantity);
            }
        }
    }

    pub(crate) fn reverse(&self, store: &mut CatalogStore) {
        for (id, quantity) in &self.dishes {
            if let Some(dish) = store.dish_mut(id) {
                dish.set_sales_count(dish.sales_count().saturating_sub(*quantity));
            }
        }
        for (id, quantity) in &self.combos {
            if let Some(combo) = store.combo_mut(id) {
                combo.set_sales_count(combo.sales_count().saturating_sub(*quantity));
            }
        }
    }
}
