//! In-memory catalog: keyed collections of ingredients, dishes, combos and orders.
//!
//! Reading is public. Writing is crate-private: outside this crate the only way
//! to change a `CatalogStore` is to run a command from [`crate::commands`]
//! (through a history manager) or to replace it wholesale from a snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use larder_core::{
    ComboId, DishId, DomainError, DomainResult, Entity, IngredientId, OrderId,
};

use crate::combo::Combo;
use crate::dish::Dish;
use crate::ingredient::Ingredient;
use crate::order::{Order, OrderStatus};
use crate::pricing;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStore {
    ingredients: BTreeMap<IngredientId, Ingredient>,
    dishes: BTreeMap<DishId, Dish>,
    combos: BTreeMap<ComboId, Combo>,
    orders: BTreeMap<OrderId, Order>,
}

/// Whole-catalog value handed to the persistence layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub ingredients: Vec<Ingredient>,
    pub dishes: Vec<Dish>,
    pub combos: Vec<Combo>,
    pub orders: Vec<Order>,
}

pub(crate) mod sealed {
    use std::collections::BTreeMap;

    use larder_core::Entity;

    use super::CatalogStore;

    /// Mutable table access, reachable only from inside this crate.
    pub trait Table: Entity + Sized {
        fn table_mut(store: &mut CatalogStore) -> &mut BTreeMap<Self::Id, Self>;
    }
}

/// A catalog entity type that the generic add/update/delete commands can manage.
pub trait Stored: sealed::Table + Clone + PartialEq + core::fmt::Debug + Send + 'static {
    fn table(store: &CatalogStore) -> &BTreeMap<Self::Id, Self>;

    /// Field-level validation.
    fn validate(&self) -> DomainResult<()>;

    /// Every entity this one refers to must exist in `store`.
    fn check_references(&self, store: &CatalogStore) -> DomainResult<()>;

    /// Refuse removal while another entity still refers to `id`.
    fn check_unreferenced(id: &Self::Id, store: &CatalogStore) -> DomainResult<()>;

    /// Recompute cached fields from the current catalog.
    fn refresh_derived(&mut self, _store: &CatalogStore) -> DomainResult<()> {
        Ok(())
    }

    /// Take over the fields that other commands maintain (stock levels, sales
    /// counters) from `current`, the stored version of this entity.
    fn adopt_owned_fields(&mut self, _current: &Self) {}
}

impl sealed::Table for Ingredient {
    fn table_mut(store: &mut CatalogStore) -> &mut BTreeMap<IngredientId, Ingredient> {
        &mut store.ingredients
    }
}

impl Stored for Ingredient {
    fn table(store: &CatalogStore) -> &BTreeMap<IngredientId, Ingredient> {
        &store.ingredients
    }

    fn validate(&self) -> DomainResult<()> {
        Ingredient::validate(self)
    }

    fn check_references(&self, _store: &CatalogStore) -> DomainResult<()> {
        Ok(())
    }

    fn check_unreferenced(id: &IngredientId, store: &CatalogStore) -> DomainResult<()> {
        match store.dishes_using(id).first() {
            Some(dish) => Err(DomainError::validation(format!(
                "ingredient {id} is used by dish {}",
                dish.id()
            ))),
            None => Ok(()),
        }
    }

    fn adopt_owned_fields(&mut self, current: &Self) {
        self.set_stock(current.quantity(), current.updated_at());
    }
}

impl sealed::Table for Dish {
    fn table_mut(store: &mut CatalogStore) -> &mut BTreeMap<DishId, Dish> {
        &mut store.dishes
    }
}

impl Stored for Dish {
    fn table(store: &CatalogStore) -> &BTreeMap<DishId, Dish> {
        &store.dishes
    }

    fn validate(&self) -> DomainResult<()> {
        Dish::validate(self)
    }

    fn check_references(&self, store: &CatalogStore) -> DomainResult<()> {
        for ingredient_id in self.ingredients().keys() {
            if store.ingredient(ingredient_id).is_none() {
                return Err(DomainError::validation(format!(
                    "dish {} references unknown ingredient {ingredient_id}",
                    self.id()
                )));
            }
        }
        Ok(())
    }

    fn check_unreferenced(id: &DishId, store: &CatalogStore) -> DomainResult<()> {
        match store.combos_containing(id).first() {
            Some(combo) => Err(DomainError::validation(format!(
                "dish {id} is part of combo {}",
                combo.id()
            ))),
            None => Ok(()),
        }
    }

    fn refresh_derived(&mut self, store: &CatalogStore) -> DomainResult<()> {
        let cost = pricing::dish_cost(self, store)?;
        self.set_cost(cost);
        Ok(())
    }

    fn adopt_owned_fields(&mut self, current: &Self) {
        self.set_sales_count(current.sales_count());
    }
}

impl sealed::Table for Combo {
    fn table_mut(store: &mut CatalogStore) -> &mut BTreeMap<ComboId, Combo> {
        &mut store.combos
    }
}

impl Stored for Combo {
    fn table(store: &CatalogStore) -> &BTreeMap<ComboId, Combo> {
        &store.combos
    }

    fn validate(&self) -> DomainResult<()> {
        Combo::validate(self)
    }

    fn check_references(&self, store: &CatalogStore) -> DomainResult<()> {
        for dish_id in self.dish_ids() {
            if store.dish(dish_id).is_none() {
                return Err(DomainError::validation(format!(
                    "combo {} references unknown dish {dish_id}",
                    self.id()
                )));
            }
        }
        Ok(())
    }

    fn check_unreferenced(_id: &ComboId, _store: &CatalogStore) -> DomainResult<()> {
        Ok(())
    }

    fn refresh_derived(&mut self, store: &CatalogStore) -> DomainResult<()> {
        let original = pricing::combo_original_price(self.dish_ids(), store)?;
        let cost = pricing::combo_cost(self.dish_ids(), store)?;
        self.set_derived(original, cost);
        Ok(())
    }

    fn adopt_owned_fields(&mut self, current: &Self) {
        self.set_sales_count(current.sales_count());
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generic lookup by id.
    pub fn get<E: Stored>(&self, id: &E::Id) -> Option<&E> {
        E::table(self).get(id)
    }

    pub fn contains<E: Stored>(&self, id: &E::Id) -> bool {
        E::table(self).contains_key(id)
    }

    pub fn ingredient(&self, id: &IngredientId) -> Option<&Ingredient> {
        self.ingredients.get(id)
    }

    pub fn ingredients(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.values()
    }

    pub fn dish(&self, id: &DishId) -> Option<&Dish> {
        self.dishes.get(id)
    }

    pub fn dishes(&self) -> impl Iterator<Item = &Dish> {
        self.dishes.values()
    }

    pub fn combo(&self, id: &ComboId) -> Option<&Combo> {
        self.combos.get(id)
    }

    pub fn combos(&self) -> impl Iterator<Item = &Combo> {
        self.combos.values()
    }

    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.orders.get(id)
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub fn orders_with_status(&self, status: OrderStatus) -> Vec<&Order> {
        self.orders.values().filter(|o| o.status() == status).collect()
    }

    pub fn low_stock_ingredients(&self) -> Vec<&Ingredient> {
        self.ingredients.values().filter(|i| i.is_low_stock()).collect()
    }

    pub fn dishes_using(&self, ingredient_id: &IngredientId) -> Vec<&Dish> {
        self.dishes
            .values()
            .filter(|d| d.uses_ingredient(ingredient_id))
            .collect()
    }

    pub fn combos_containing(&self, dish_id: &DishId) -> Vec<&Combo> {
        self.combos
            .values()
            .filter(|c| c.contains_dish(dish_id))
            .collect()
    }

    /// Dishes ordered by sales count, highest first (ties by id).
    pub fn best_selling_dishes(&self, limit: usize) -> Vec<&Dish> {
        let mut dishes: Vec<&Dish> = self.dishes.values().collect();
        dishes.sort_by(|a, b| b.sales_count().cmp(&a.sales_count()).then_with(|| a.id().cmp(b.id())));
        dishes.truncate(limit);
        dishes
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            ingredients: self.ingredients.values().cloned().collect(),
            dishes: self.dishes.values().cloned().collect(),
            combos: self.combos.values().cloned().collect(),
            orders: self.orders.values().cloned().collect(),
        }
    }

    /// Rebuild a store from a snapshot. Duplicate ids are rejected.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> DomainResult<Self> {
        let mut store = Self::new();
        for ingredient in snapshot.ingredients {
            insert_unique(&mut store.ingredients, ingredient)?;
        }
        for dish in snapshot.dishes {
            insert_unique(&mut store.dishes, dish)?;
        }
        for combo in snapshot.combos {
            insert_unique(&mut store.combos, combo)?;
        }
        for order in snapshot.orders {
            insert_unique(&mut store.orders, order)?;
        }
        Ok(store)
    }

    pub(crate) fn ingredient_mut(&mut self, id: &IngredientId) -> Option<&mut Ingredient> {
        self.ingredients.get_mut(id)
    }

    pub(crate) fn dish_mut(&mut self, id: &DishId) -> Option<&mut Dish> {
        self.dishes.get_mut(id)
    }

    pub(crate) fn combo_mut(&mut self, id: &ComboId) -> Option<&mut Combo> {
        self.combos.get_mut(id)
    }

    pub(crate) fn order_mut(&mut self, id: &OrderId) -> Option<&mut Order> {
        self.orders.get_mut(id)
    }

    pub(crate) fn insert_order(&mut self, order: Order) {
        self.orders.insert(order.id().clone(), order);
    }

    pub(crate) fn remove_order(&mut self, id: &OrderId) -> Option<Order> {
        self.orders.remove(id)
    }
}

fn insert_unique<E: Entity>(table: &mut BTreeMap<E::Id, E>, entity: E) -> DomainResult<()> {
    let id = entity.id().clone();
    if table.contains_key(&id) {
        return Err(DomainError::conflict(format!(
            "duplicate {} {id} in snapshot",
            E::KIND
        )));
    }
    table.insert(id, entity);
    Ok(())
}
