use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use larder_core::{DomainError, DomainResult, Entity, IngredientId};

/// A stocked ingredient.
///
/// `quantity` is never negative. Stock only changes through commands
/// (stock adjustments, order fulfillment and their inverses), each of which
/// stamps `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    id: IngredientId,
    name: String,
    unit: String,
    quantity: Decimal,
    min_quantity: Decimal,
    unit_price: Decimal,
    updated_at: DateTime<Utc>,
}

impl Ingredient {
    pub fn new(
        id: impl Into<IngredientId>,
        name: impl Into<String>,
        unit: impl Into<String>,
        quantity: Decimal,
        min_quantity: Decimal,
        unit_price: Decimal,
    ) -> DomainResult<Self> {
        let ingredient = Self {
            id: id.into(),
            name: name.into(),
            unit: unit.into(),
            quantity,
            min_quantity,
            unit_price,
            updated_at: Utc::now(),
        };
        ingredient.validate()?;
        Ok(ingredient)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn min_quantity(&self) -> Decimal {
        self.min_quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// At or below the minimum threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }

    /// Value of the stock on hand at the current unit price.
    pub fn stock_value(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_min_quantity(mut self, min_quantity: Decimal) -> Self {
        self.min_quantity = min_quantity;
        self
    }

    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = unit_price;
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainError::validation("ingredient id cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("ingredient name cannot be empty"));
        }
        if self.quantity < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "ingredient {} quantity cannot be negative",
                self.id
            )));
        }
        if self.min_quantity < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "ingredient {} minimum quantity cannot be negative",
                self.id
            )));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "ingredient {} unit price cannot be negative",
                self.id
            )));
        }
        Ok(())
    }

    pub(crate) fn set_stock(&mut self, quantity: Decimal, at: DateTime<Utc>) {
        self.quantity = quantity;
        self.updated_at = at;
    }
}

impl Entity for Ingredient {
    type Id = IngredientId;

    const KIND: &'static str = "ingredient";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salt() -> Ingredient {
        Ingredient::new(
            "SALT",
            "Salt",
            "g",
            Decimal::from(10),
            Decimal::from(2),
            Decimal::from(1000),
        )
        .unwrap()
    }

    #[test]
    fn low_stock_is_inclusive_of_minimum() {
        let ingredient = salt();
        assert!(!ingredient.is_low_stock());

        let mut ingredient = ingredient;
        ingredient.set_stock(Decimal::from(2), Utc::now());
        assert!(ingredient.is_low_stock());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let err = Ingredient::new(
            "SALT",
            "Salt",
            "g",
            Decimal::from(-1),
            Decimal::ZERO,
            Decimal::ONE,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("negative")));
    }

    #[test]
    fn builders_do_not_touch_stock() {
        let edited = salt().with_name("Sea salt").with_unit_price(Decimal::from(1200));
        assert_eq!(edited.name(), "Sea salt");
        assert_eq!(edited.quantity(), Decimal::from(10));
        assert_eq!(edited.stock_value(), Decimal::from(12000));
    }
}
