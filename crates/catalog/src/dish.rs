use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use larder_core::{DishId, DomainError, DomainResult, Entity, IngredientId};

/// A dish on the menu and its recipe.
///
/// `cost` is a cached value derived from the recipe and ingredient prices; it is
/// refreshed when the dish is added or updated and by the cost recalculation
/// command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    id: DishId,
    name: String,
    category: String,
    price: Decimal,
    available: bool,
    /// Ingredient id -> quantity per serving.
    ingredients: BTreeMap<IngredientId, Decimal>,
    cost: Decimal,
    sales_count: u64,
}

impl Dish {
    pub fn new(
        id: impl Into<DishId>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
    ) -> DomainResult<Self> {
        let dish = Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            price,
            available: true,
            ingredients: BTreeMap::new(),
            cost: Decimal::ZERO,
            sales_count: 0,
        };
        dish.validate()?;
        Ok(dish)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn ingredients(&self) -> &BTreeMap<IngredientId, Decimal> {
        &self.ingredients
    }

    pub fn uses_ingredient(&self, id: &IngredientId) -> bool {
        self.ingredients.contains_key(id)
    }

    /// Cached cost of one serving.
    pub fn cost(&self) -> Decimal {
        self.cost
    }

    pub fn sales_count(&self) -> u64 {
        self.sales_count
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Set the per-serving quantity of an ingredient (replaces any previous amount).
    pub fn with_ingredient(mut self, id: impl Into<IngredientId>, quantity: Decimal) -> Self {
        self.ingredients.insert(id.into(), quantity);
        self
    }

    pub fn without_ingredient(mut self, id: &IngredientId) -> Self {
        self.ingredients.remove(id);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainError::validation("dish id cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("dish name cannot be empty"));
        }
        if self.price < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "dish {} price cannot be negative",
                self.id
            )));
        }
        for (ingredient_id, quantity) in &self.ingredients {
            if *quantity <= Decimal::ZERO {
                return Err(DomainError::validation(format!(
                    "dish {} requires a positive quantity of {}",
                    self.id, ingredient_id
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn set_cost(&mut self, cost: Decimal) {
        self.cost = cost;
    }

    pub(crate) fn record_sales(&mut self, quantity: u64) {
        self.sales_count = self.sales_count.saturating_add(quantity);
    }

    pub(crate) fn set_sales_count(&mut self, count: u64) {
        self.sales_count = count;
    }
}

impl Entity for Dish {
    type Id = DishId;

    const KIND: &'static str = "dish";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
