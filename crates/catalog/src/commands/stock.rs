use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use larder_core::{DomainError, DomainResult, IngredientId};
use larder_history::Command;

use crate::store::CatalogStore;

/// Restock (positive delta) or write off (negative delta) an ingredient.
#[derive(Debug, Clone)]
pub struct AdjustStock {
    ingredient_id: IngredientId,
    delta: Decimal,
    description: String,
    before: Option<(Decimal, DateTime<Utc>)>,
}

impl AdjustStock {
    pub fn new(store: &CatalogStore, ingredient_id: IngredientId, delta: Decimal) -> DomainResult<Self> {
        let ingredient = store
            .ingredient(&ingredient_id)
            .ok_or_else(|| DomainError::not_found(format!("ingredient {ingredient_id}")))?;

        if delta.is_zero() {
            return Err(DomainError::validation("delta cannot be zero"));
        }
        if adjusted(ingredient.quantity(), delta, &ingredient_id)? < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "stock of {ingredient_id} cannot go negative"
            )));
        }

        let description = format!("Adjust stock of {ingredient_id} by {delta}");
        Ok(Self {
            ingredient_id,
            delta,
            description,
            before: None,
        })
    }

    pub fn delta(&self) -> Decimal {
        self.delta
    }
}

fn adjusted(quantity: Decimal, delta: Decimal, id: &IngredientId) -> DomainResult<Decimal> {
    quantity
        .checked_add(delta)
        .ok_or_else(|| DomainError::out_of_range(format!("stock of {id}")))
}

impl Command<CatalogStore> for AdjustStock {
    fn execute(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        let ingredient = store
            .ingredient_mut(&self.ingredient_id)
            .ok_or_else(|| DomainError::not_found(format!("ingredient {}", self.ingredient_id)))?;

        let next = adjusted(ingredient.quantity(), self.delta, &self.ingredient_id)?;
        if next < Decimal::ZERO {
            return Err(DomainError::invariant(format!(
                "stock of {} cannot go negative",
                self.ingredient_id
            )));
        }

        self.before = Some((ingredient.quantity(), ingredient.updated_at()));
        ingredient.set_stock(next, Utc::now());
        Ok(())
    }

    fn undo(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        let (quantity, updated_at) = self
            .before
            .ok_or_else(|| DomainError::invariant("stock adjustment was never executed"))?;
        let ingredient = store
            .ingredient_mut(&self.ingredient_id)
            .ok_or_else(|| DomainError::not_found(format!("ingredient {}", self.ingredient_id)))?;

        ingredient.set_stock(quantity, updated_at);
        self.before = None;
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
