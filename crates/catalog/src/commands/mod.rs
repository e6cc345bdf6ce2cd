//! Reversible catalog mutations.
//!
//! Every command validates what it can when it is built, so a command that
//! exists is one that can be handed to a history manager. Execution re-checks
//! anything that may have changed in between and only then mutates.

mod cancel;
mod costs;
mod entity;
mod order;
mod sales;
mod status;
mod stock;

pub use cancel::CancelOrder;
pub use costs::RecalculateCosts;
pub use entity::{AddEntity, BatchAdd, BatchDelete, DeleteEntity, UpdateEntity};
pub use order::CreateOrder;
pub use status::SetOrderStatus;
pub use stock::AdjustStock;

use crate::combo::Combo;
use crate::dish::Dish;
use crate::ingredient::Ingredient;

pub type AddIngredient = AddEntity<Ingredient>;
pub type UpdateIngredient = UpdateEntity<Ingredient>;
pub type DeleteIngredient = DeleteEntity<Ingredient>;
pub type BatchAddIngredients = BatchAdd<Ingredient>;
pub type BatchDeleteIngredients = BatchDelete<Ingredient>;

pub type AddDish = AddEntity<Dish>;
pub type UpdateDish = UpdateEntity<Dish>;
pub type DeleteDish = DeleteEntity<Dish>;
pub type BatchAddDishes = BatchAdd<Dish>;
pub type BatchDeleteDishes = BatchDelete<Dish>;

pub type AddCombo = AddEntity<Combo>;
pub type UpdateCombo = UpdateEntity<Combo>;
pub type DeleteCombo = DeleteEntity<Combo>;
