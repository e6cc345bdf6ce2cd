use rust_decimal::Decimal;

use larder_core::{ComboId, DishId, DomainError, DomainResult, Entity};
use larder_history::Command;

use crate::pricing;
use crate::store::CatalogStore;

/// Recompute every cached dish cost, then every combo's price and cost, from
/// current ingredient prices and recipes.
#[derive(Debug, Clone, Default)]
pub struct RecalculateCosts {
    before: Option<CachedCosts>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CachedCosts {
    dishes: Vec<(DishId, Decimal)>,
    combos: Vec<(ComboId, Decimal, Decimal)>,
}

impl CachedCosts {
    fn capture(store: &CatalogStore) -> Self {
        Self {
            dishes: store.dishes().map(|d| (d.id().clone(), d.cost())).collect(),
            combos: store
                .combos()
                .map(|c| (c.id().clone(), c.original_price(), c.cost()))
                .collect(),
        }
    }

    fn restore(&self, store: &mut CatalogStore) {
        for (id, cost) in &self.dishes {
            if let Some(dish) = store.dish_mut(id) {
                dish.set_cost(*cost);
            }
        }
        for (id, original, cost) in &self.combos {
            if let Some(combo) = store.combo_mut(id) {
                combo.set_derived(*original, *cost);
            }
        }
    }
}

impl RecalculateCosts {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Command<CatalogStore> for RecalculateCosts {
    fn execute(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        let before = CachedCosts::capture(store);

        let dish_costs = store
            .dishes()
            .map(|d| Ok((d.id().clone(), pricing::dish_cost(d, store)?)))
            .collect::<DomainResult<Vec<(DishId, Decimal)>>>()?;
        for (id, cost) in dish_costs {
            if let Some(dish) = store.dish_mut(&id) {
                dish.set_cost(cost);
            }
        }

        // Combos read the dish costs written above.
        let combo_prices = store
            .combos()
            .map(|c| {
                Ok((
                    c.id().clone(),
                    pricing::combo_original_price(c.dish_ids(), store)?,
                    pricing::combo_cost(c.dish_ids(), store)?,
                ))
            })
            .collect::<DomainResult<Vec<(ComboId, Decimal, Decimal)>>>();
        let combo_prices = match combo_prices {
            Ok(prices) => prices,
            Err(err) => {
                before.restore(store);
                return Err(err);
            }
        };
        for (id, original, cost) in combo_prices {
            if let Some(combo) = store.combo_mut(&id) {
                combo.set_derived(original, cost);
            }
        }

        self.before = Some(before);
        Ok(())
    }

    fn undo(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        let before = self
            .before
            .take()
            .ok_or_else(|| DomainError::invariant("cost recalculation was never executed"))?;
        before.restore(store);
        Ok(())
    }

    fn description(&self) -> &str {
        "Recalculate costs"
    }
}
