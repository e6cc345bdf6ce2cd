//! Pure cost and price derivations over a catalog.
//!
//! Missing references contribute nothing; referential integrity is enforced
//! when commands are built, not here. Sums and products are checked and fail
//! with a validation error rather than wrap or panic.

use rust_decimal::Decimal;

use larder_core::{DishId, DomainError, DomainResult, Entity};

use crate::dish::Dish;
use crate::store::CatalogStore;

/// Cost of one serving: sum of recipe quantity x ingredient unit price.
pub fn dish_cost(dish: &Dish, store: &CatalogStore) -> DomainResult<Decimal> {
    let what = || format!("cost of dish {}", dish.id());
    let mut cost = Decimal::ZERO;
    for (id, quantity) in dish.ingredients() {
        let Some(ingredient) = store.ingredient(id) else {
            continue;
        };
        let line = quantity
            .checked_mul(ingredient.unit_price())
            .ok_or_else(|| DomainError::out_of_range(what()))?;
        cost = cost.checked_add(line).ok_or_else(|| DomainError::out_of_range(what()))?;
    }
    Ok(cost)
}

/// Sum of member dish prices.
pub fn combo_original_price(dish_ids: &[DishId], store: &CatalogStore) -> DomainResult<Decimal> {
    sum_members(dish_ids, store, Dish::price, "combo price")
}

/// Sum of member dish cached costs.
pub fn combo_cost(dish_ids: &[DishId], store: &CatalogStore) -> DomainResult<Decimal> {
    sum_members(dish_ids, store, Dish::cost, "combo cost")
}

fn sum_members(
    dish_ids: &[DishId],
    store: &CatalogStore,
    field: fn(&Dish) -> Decimal,
    what: &str,
) -> DomainResult<Decimal> {
    dish_ids
        .iter()
        .filter_map(|id| store.dish(id))
        .try_fold(Decimal::ZERO, |sum, dish| {
            sum.checked_add(field(dish)).ok_or_else(|| DomainError::out_of_range(what))
        })
}

/// `original x (1 - discount_percent / 100)`.
pub fn discounted_price(original: Decimal, discount_percent: Decimal) -> Decimal {
    original * (Decimal::ONE - discount_percent / Decimal::ONE_HUNDRED)
}

/// Gross margin as a percentage of price, or `None` for a zero price.
pub fn profit_margin_percent(price: Decimal, cost: Decimal) -> Option<Decimal> {
    if price.is_zero() {
        return None;
    }
    Some((price - cost) / price * Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::salt_and_soup;

    #[test]
    fn dish_cost_multiplies_recipe_by_unit_price() {
        let store = salt_and_soup();
        let soup = store.dish(&DishId::new("SOUP")).unwrap();
        assert_eq!(dish_cost(soup, &store), Ok(Decimal::from(3000)));
        assert_eq!(soup.cost(), Decimal::from(3000));
    }

    #[test]
    fn combo_sums_member_prices_and_costs() {
        let store = salt_and_soup();
        let ids = vec![DishId::new("SOUP"), DishId::new("MISSING")];
        assert_eq!(combo_original_price(&ids, &store), Ok(Decimal::from(50000)));
        assert_eq!(combo_cost(&ids, &store), Ok(Decimal::from(3000)));
    }

    #[test]
    fn sums_past_the_decimal_range_are_errors() {
        let mut store = salt_and_soup();
        let lobster = Dish::new("LOBSTER", "Lobster", "Main", Decimal::MAX).unwrap();
        crate::test_support::put(&mut store, lobster);

        let ids = vec![DishId::new("LOBSTER"), DishId::new("LOBSTER")];
        assert!(matches!(
            combo_original_price(&ids, &store),
            Err(DomainError::Validation(msg)) if msg.contains("out of range")
        ));

        let brine = Dish::new("BRINE", "Brine", "Side", Decimal::ONE)
            .unwrap()
            .with_ingredient("SALT", Decimal::MAX);
        assert!(dish_cost(&brine, &store).is_err());
    }

    #[test]
    fn discount_and_margin() {
        assert_eq!(
            discounted_price(Decimal::from(200), Decimal::from(15)),
            Decimal::from(170)
        );
        assert_eq!(
            profit_margin_percent(Decimal::from(50000), Decimal::from(3000)),
            Some(Decimal::from(94))
        );
        assert_eq!(profit_margin_percent(Decimal::ZERO, Decimal::ONE), None);
    }
}
