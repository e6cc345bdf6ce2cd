//! Restaurant catalog domain: ingredients, dishes, combos and orders.
//!
//! This crate holds the catalog state and every reversible command that
//! mutates it. It performs no IO; persistence and history wiring live in
//! `larder-engine`.

pub mod combo;
pub mod commands;
pub mod dish;
pub mod fulfillment;
pub mod ingredient;
pub mod order;
pub mod pricing;
pub mod store;

#[cfg(test)]
mod test_support;

pub use combo::Combo;
pub use commands::{
    AddCombo, AddDish, AddEntity, AddIngredient, AdjustStock, BatchAdd, BatchAddDishes,
    BatchAddIngredients, BatchDelete, BatchDeleteDishes, BatchDeleteIngredients, CancelOrder,
    CreateOrder, DeleteCombo, DeleteDish, DeleteEntity, DeleteIngredient, RecalculateCosts,
    SetOrderStatus, UpdateCombo, UpdateDish, UpdateEntity, UpdateIngredient,
};
pub use dish::Dish;
pub use fulfillment::{
    Requirement, ResolvedRequirements, check_stock, is_combo_fulfillable, is_dish_fulfillable,
    resolve_items,
};
pub use ingredient::Ingredient;
pub use order::{ItemRef, Order, OrderItem, OrderStatus};
pub use store::{CatalogSnapshot, CatalogStore, Stored};
