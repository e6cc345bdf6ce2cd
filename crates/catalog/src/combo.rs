use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use larder_core::{ComboId, DishId, DomainError, DomainResult, Entity};

use crate::pricing;

/// A discounted bundle of dishes.
///
/// `original_price` and `cost` are derived from the member dishes and cached
/// the same way a dish caches its cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combo {
    id: ComboId,
    name: String,
    /// Member dishes, in menu order, without duplicates.
    dish_ids: Vec<DishId>,
    discount_percent: Decimal,
    available: bool,
    original_price: Decimal,
    cost: Decimal,
    sales_count: u64,
}

impl Combo {
    pub fn new(
        id: impl Into<ComboId>,
        name: impl Into<String>,
        discount_percent: Decimal,
    ) -> DomainResult<Self> {
        let combo = Self {
            id: id.into(),
            name: name.into(),
            dish_ids: Vec::new(),
            discount_percent,
            available: true,
            original_price: Decimal::ZERO,
            cost: Decimal::ZERO,
            sales_count: 0,
        };
        combo.validate_fields()?;
        Ok(combo)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dish_ids(&self) -> &[DishId] {
        &self.dish_ids
    }

    pub fn contains_dish(&self, id: &DishId) -> bool {
        self.dish_ids.contains(id)
    }

    pub fn discount_percent(&self) -> Decimal {
        self.discount_percent
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Sum of member dish prices.
    pub fn original_price(&self) -> Decimal {
        self.original_price
    }

    /// Sum of member dish costs.
    pub fn cost(&self) -> Decimal {
        self.cost
    }

    /// Price after discount.
    pub fn final_price(&self) -> Decimal {
        pricing::discounted_price(self.original_price, self.discount_percent)
    }

    pub fn sales_count(&self) -> u64 {
        self.sales_count
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_discount_percent(mut self, discount_percent: Decimal) -> Self {
        self.discount_percent = discount_percent;
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Append a member dish. Adding a dish that is already a member is a no-op.
    pub fn with_dish(mut self, id: impl Into<DishId>) -> Self {
        let id = id.into();
        if !self.dish_ids.contains(&id) {
            self.dish_ids.push(id);
        }
        self
    }

    pub fn without_dish(mut self, id: &DishId) -> Self {
        self.dish_ids.retain(|d| d != id);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        self.validate_fields()?;
        if self.dish_ids.is_empty() {
            return Err(DomainError::validation(format!(
                "combo {} must contain at least one dish",
                self.id
            )));
        }
        Ok(())
    }

    fn validate_fields(&self) -> DomainResult<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainError::validation("combo id cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("combo name cannot be empty"));
        }
        if self.discount_percent < Decimal::ZERO || self.discount_percent > Decimal::ONE_HUNDRED {
            return Err(DomainError::validation(format!(
                "combo {} discount must be between 0 and 100 percent",
                self.id
            )));
        }
        Ok(())
    }

    pub(crate) fn set_derived(&mut self, original_price: Decimal, cost: Decimal) {
        self.original_price = original_price;
        self.cost = cost;
    }

    pub(crate) fn record_sales(&mut self, quantity: u64) {
        self.sales_count = self.sales_count.saturating_add(quantity);
    }

    pub(crate) fn set_sales_count(&mut self, count: u64) {
        self.sales_count = count;
    }
}

impl Entity for Combo {
    type Id = ComboId;

    const KIND: &'static str = "combo";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_dishes_stay_unique_and_ordered() {
        let combo = Combo::new("LUNCH", "Lunch set", Decimal::from(10))
            .unwrap()
            .with_dish("SOUP")
            .with_dish("RICE")
            .with_dish("SOUP");
        assert_eq!(combo.dish_ids(), &[DishId::new("SOUP"), DishId::new("RICE")]);
    }

    #[test]
    fn empty_combo_fails_validation() {
        let combo = Combo::new("LUNCH", "Lunch set", Decimal::ZERO).unwrap();
        assert!(combo.validate().is_err());
    }

    #[test]
    fn discount_over_hundred_is_rejected() {
        assert!(Combo::new("LUNCH", "Lunch set", Decimal::from(101)).is_err());
    }

    #[test]
    fn final_price_applies_discount() {
        let mut combo = Combo::new("LUNCH", "Lunch set", Decimal::from(20))
            .unwrap()
            .with_dish("SOUP");
        combo.set_derived(Decimal::from(100000), Decimal::from(30000));
        assert_eq!(combo.final_price(), Decimal::from(80000));
    }
}
