//! Ingredient demand of orders, and the stock check that gates fulfillment.
//!
//! An order's demand is resolved into one total per ingredient *before* stock is
//! checked: two lines that share an ingredient are checked against their sum,
//! never one at a time.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use larder_core::{DomainError, DomainResult, Entity, IngredientId};

use crate::combo::Combo;
use crate::dish::Dish;
use crate::order::{ItemRef, OrderItem};
use crate::store::CatalogStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub ingredient_id: IngredientId,
    pub quantity: Decimal,
}

/// Total demand per ingredient, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRequirements {
    entries: Vec<Requirement>,
    index: HashMap<IngredientId, usize>,
}

impl ResolvedRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a recorded list, summing repeated ingredients.
    pub fn from_requirements(requirements: &[Requirement]) -> DomainResult<Self> {
        let mut resolved = Self::new();
        for req in requirements {
            resolved.add(&req.ingredient_id, req.quantity)?;
        }
        Ok(resolved)
    }

    /// Accumulate `quantity` of `ingredient_id`.
    pub fn add(&mut self, ingredient_id: &IngredientId, quantity: Decimal) -> DomainResult<()> {
        match self.index.get(ingredient_id) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                entry.quantity = entry
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| DomainError::out_of_range(format!("demand for {ingredient_id}")))?;
            }
            None => {
                self.index.insert(ingredient_id.clone(), self.entries.len());
                self.entries.push(Requirement {
                    ingredient_id: ingredient_id.clone(),
                    quantity,
                });
            }
        }
        Ok(())
    }

    /// Add the recipe of `dish` for `servings` servings.
    pub fn add_dish(&mut self, dish: &Dish, servings: u32) -> DomainResult<()> {
        let servings = Decimal::from(servings);
        for (ingredient_id, per_serving) in dish.ingredients() {
            let quantity = per_serving.checked_mul(servings).ok_or_else(|| {
                DomainError::out_of_range(format!("{ingredient_id} needed by dish {}", dish.id()))
            })?;
            self.add(ingredient_id, quantity)?;
        }
        Ok(())
    }

    pub fn get(&self, ingredient_id: &IngredientId) -> Option<Decimal> {
        self.index.get(ingredient_id).map(|&i| self.entries[i].quantity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<Requirement> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve the combined ingredient demand of `items`, expanding combos into
/// their member dishes.
///
/// Fails with `NotFound` if a referenced dish or combo no longer exists.
pub fn resolve_items(store: &CatalogStore, items: &[OrderItem]) -> DomainResult<ResolvedRequirements> {
    let mut resolved = ResolvedRequirements::new();
    for item in items {
        match item.item() {
            ItemRef::Dish(id) => {
                let dish = store
                    .dish(id)
                    .ok_or_else(|| DomainError::not_found(format!("dish {id}")))?;
                resolved.add_dish(dish, item.quantity())?;
            }
            ItemRef::Combo(id) => {
                let combo = store
                    .combo(id)
                    .ok_or_else(|| DomainError::not_found(format!("combo {id}")))?;
                add_combo(store, &mut resolved, combo, item.quantity())?;
            }
        }
    }
    Ok(resolved)
}

fn add_combo(
    store: &CatalogStore,
    resolved: &mut ResolvedRequirements,
    combo: &Combo,
    quantity: u32,
) -> DomainResult<()> {
    for dish_id in combo.dish_ids() {
        let dish = store.dish(dish_id).ok_or_else(|| {
            DomainError::not_found(format!("dish {dish_id} of combo {}", combo.name()))
        })?;
        resolved.add_dish(dish, quantity)?;
    }
    Ok(())
}

/// Check every requirement against stock on hand.
///
/// Returns `InsufficientStock` for the first ingredient (in order of first
/// demand) whose stock does not cover its total. A missing ingredient counts
/// as zero stock. Nothing is mutated.
pub fn check_stock(store: &CatalogStore, resolved: &ResolvedRequirements) -> DomainResult<()> {
    for req in resolved.iter() {
        let available = store
            .ingredient(&req.ingredient_id)
            .map(|i| i.quantity())
            .unwrap_or(Decimal::ZERO);
        if available < req.quantity {
            return Err(DomainError::insufficient_stock(
                req.ingredient_id.clone(),
                req.quantity,
                available,
            ));
        }
    }
    Ok(())
}

/// One serving of `dish` can be made from current stock.
pub fn is_dish_fulfillable(store: &CatalogStore, dish: &Dish) -> bool {
    let mut resolved = ResolvedRequirements::new();
    resolved.add_dish(dish, 1).is_ok() && check_stock(store, &resolved).is_ok()
}

/// One combo can be made from current stock, counting shared ingredients
/// across its member dishes together.
pub fn is_combo_fulfillable(store: &CatalogStore, combo: &Combo) -> bool {
    let mut resolved = ResolvedRequirements::new();
    add_combo(store, &mut resolved, combo, 1).is_ok() && check_stock(store, &resolved).is_ok()
}

/// Deduct every requirement from stock. Callers check stock first.
pub(crate) fn consume(store: &mut CatalogStore, resolved: &ResolvedRequirements, at: DateTime<Utc>) {
    for req in resolved.iter() {
        if let Some(ingredient) = store.ingredient_mut(&req.ingredient_id) {
            let remaining = ingredient.quantity() - req.quantity;
            ingredient.set_stock(remaining, at);
        }
    }
}

/// Put every requirement back into stock. Ingredients no longer in the
/// catalog are skipped.
///
/// New levels are computed before anything is written, so an overflow leaves
/// stock untouched.
pub(crate) fn replenish(
    store: &mut CatalogStore,
    resolved: &ResolvedRequirements,
    at: DateTime<Utc>,
) -> DomainResult<()> {
    let mut restocked = Vec::with_capacity(resolved.len());
    for req in resolved.iter() {
        if let Some(ingredient) = store.ingredient(&req.ingredient_id) {
            let quantity = ingredient
                .quantity()
                .checked_add(req.quantity)
                .ok_or_else(|| DomainError::out_of_range(format!("stock of {}", req.ingredient_id)))?;
            restocked.push((&req.ingredient_id, quantity));
        }
    }
    for (id, quantity) in restocked {
        if let Some(ingredient) = store.ingredient_mut(id) {
            ingredient.set_stock(quantity, at);
        }
    }
    Ok(())
}

/// Pre-mutation stock levels of the ingredients an operation is about to touch.
///
/// Restoring writes each quantity and timestamp back verbatim rather than
/// re-adding amounts, so an undo lands on exactly the captured values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StockSnapshot {
    entries: Vec<(IngredientId, Decimal, DateTime<Utc>)>,
}

impl StockSnapshot {
    /// Capture every ingredient in `resolved`. Fails if any is missing.
    pub(crate) fn capture(store: &CatalogStore, resolved: &ResolvedRequirements) -> DomainResult<Self> {
        let mut entries = Vec::with_capacity(resolved.len());
        for req in resolved.iter() {
            let ingredient = store
                .ingredient(&req.ingredient_id)
                .ok_or_else(|| DomainError::not_found(format!("ingredient {}", req.ingredient_id)))?;
            entries.push((
                req.ingredient_id.clone(),
                ingredient.quantity(),
                ingredient.updated_at(),
            ));
        }
        Ok(Self { entries })
    }

    /// Every captured ingredient is still present.
    pub(crate) fn check_restorable(&self, store: &CatalogStore) -> DomainResult<()> {
        for (id, _, _) in &self.entries {
            if store.ingredient(id).is_none() {
                return Err(DomainError::invariant(format!(
                    "ingredient {id} disappeared before its stock could be restored"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn restore(&self, store: &mut CatalogStore) {
        for (id, quantity, updated_at) in &self.entries {
            if let Some(ingredient) = store.ingredient_mut(id) {
                ingredient.set_stock(*quantity, *updated_at);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{kitchen_store, salt_and_soup};
    use larder_core::{ComboId, DishId};

    fn dish_item(store: &CatalogStore, id: &str, quantity: u32) -> OrderItem {
        OrderItem::dish(store.dish(&DishId::new(id)).unwrap(), quantity)
    }

    #[test]
    fn shared_ingredients_are_summed_across_lines() {
        let store = kitchen_store();
        let items = vec![dish_item(&store, "SOUP", 1), dish_item(&store, "STEW", 1)];

        let resolved = resolve_items(&store, &items).unwrap();
        // SOUP needs 3 SALT, STEW needs 4 SALT.
        assert_eq!(resolved.get(&IngredientId::new("SALT")), Some(Decimal::from(7)));
    }

    #[test]
    fn combos_expand_into_member_dishes() {
        let store = kitchen_store();
        let combo = store.combo(&ComboId::new("DUO")).unwrap();
        let items = vec![OrderItem::combo(combo, 2)];

        let resolved = resolve_items(&store, &items).unwrap();
        assert_eq!(resolved.get(&IngredientId::new("SALT")), Some(Decimal::from(14)));
        assert_eq!(resolved.get(&IngredientId::new("BEEF")), Some(Decimal::from(2)));
        assert_eq!(resolved.iter().next().unwrap().ingredient_id.as_str(), "SALT");
    }

    #[test]
    fn check_reports_first_shortfall() {
        let store = salt_and_soup();
        let items = vec![dish_item(&store, "SOUP", 4)];
        let resolved = resolve_items(&store, &items).unwrap();

        let err = check_stock(&store, &resolved).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                ingredient_id: IngredientId::new("SALT"),
                required: Decimal::from(12),
                available: Decimal::from(10),
            }
        );
        assert_eq!(err.shortfall(), Some(Decimal::from(2)));
    }

    #[test]
    fn unknown_dish_is_not_found() {
        let kitchen = kitchen_store();
        let items = vec![dish_item(&kitchen, "STEW", 1)];

        let store = salt_and_soup();
        assert!(matches!(
            resolve_items(&store, &items),
            Err(DomainError::NotFound(msg)) if msg.contains("STEW")
        ));
    }

    #[test]
    fn combo_fulfillability_counts_shared_ingredients_together() {
        let mut store = kitchen_store();
        let combo = store.combo(&ComboId::new("DUO")).unwrap().clone();
        assert!(is_combo_fulfillable(&store, &combo));

        // SOUP needs 3 SALT and STEW needs 4: each fits in 6, the pair does not.
        store
            .ingredient_mut(&IngredientId::new("SALT"))
            .unwrap()
            .set_stock(Decimal::from(6), Utc::now());

        for id in ["SOUP", "STEW"] {
            let dish = store.dish(&DishId::new(id)).unwrap();
            assert!(is_dish_fulfillable(&store, dish));
        }
        assert!(!is_combo_fulfillable(&store, &combo));
    }

    #[test]
    fn runaway_demand_is_out_of_range() {
        let mut store = salt_and_soup();
        let water = crate::ingredient::Ingredient::new(
            "WATER",
            "Water",
            "l",
            Decimal::from(10),
            Decimal::ZERO,
            Decimal::ZERO,
        )
        .unwrap();
        let bucket = Dish::new("BUCKET", "Bucket", "Main", Decimal::ONE)
            .unwrap()
            .with_ingredient("WATER", Decimal::MAX);
        crate::test_support::put(&mut store, water);
        crate::test_support::put(&mut store, bucket);

        let items = vec![dish_item(&store, "BUCKET", 2)];
        assert!(matches!(
            resolve_items(&store, &items),
            Err(DomainError::Validation(msg)) if msg.contains("out of range")
        ));

        let twice = vec![dish_item(&store, "BUCKET", 1), dish_item(&store, "BUCKET", 1)];
        assert!(resolve_items(&store, &twice).is_err());
    }

    #[test]
    fn recorded_requirements_rebuild_the_same_demand() {
        let store = kitchen_store();
        let items = vec![dish_item(&store, "SOUP", 1), dish_item(&store, "STEW", 2)];
        let resolved = resolve_items(&store, &items).unwrap();

        let rebuilt = ResolvedRequirements::from_requirements(&resolved.to_vec()).unwrap();
        assert_eq!(rebuilt, resolved);
    }

    #[test]
    fn replenish_overflow_leaves_stock_untouched() {
        let mut store = kitchen_store();
        let before = store.clone();
        let mut resolved = ResolvedRequirements::new();
        resolved.add(&IngredientId::new("SALT"), Decimal::ONE).unwrap();
        resolved.add(&IngredientId::new("BEEF"), Decimal::MAX).unwrap();

        assert!(replenish(&mut store, &resolved, Utc::now()).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn snapshot_restores_captured_values_verbatim() {
        let mut store = salt_and_soup();
        let items = vec![dish_item(&store, "SOUP", 1)];
        let resolved = resolve_items(&store, &items).unwrap();
        let before = store.ingredient(&IngredientId::new("SALT")).unwrap().clone();

        let snapshot = StockSnapshot::capture(&store, &resolved).unwrap();
        store
            .ingredient_mut(&IngredientId::new("SALT"))
            .unwrap()
            .set_stock(Decimal::new(33, 1), Utc::now());

        snapshot.check_restorable(&store).unwrap();
        snapshot.restore(&mut store);
        assert_eq!(store.ingredient(&IngredientId::new("SALT")), Some(&before));
    }
}
