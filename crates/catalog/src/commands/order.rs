//! Order creation with atomic stock fulfillment.
//!
//! Executing runs in two phases. The check phase resolves the order's total
//! demand per ingredient and verifies all of it against stock without touching
//! anything. The commit phase then deducts stock, bumps sales counters and
//! inserts the order along with the demand it consumed. An order that fails
//! the check leaves the catalog exactly as it was.

use chrono::Utc;
use tracing::{info, warn};

use larder_core::{DomainError, DomainResult, Entity};
use larder_history::Command;

use crate::commands::sales::SalesTally;
use crate::fulfillment::{self, StockSnapshot};
use crate::order::{ItemRef, Order, OrderStatus};
use crate::store::CatalogStore;

#[derive(Debug, Clone)]
pub struct CreateOrder {
    order: Order,
    tally: SalesTally,
    description: String,
    snapshot: Option<StockSnapshot>,
}

impl CreateOrder {
    /// Validates the order and that every line refers to an existing,
    /// available dish or combo. Stock is not checked until execution.
    pub fn new(store: &CatalogStore, order: Order) -> DomainResult<Self> {
        order.validate()?;
        if order.status() != OrderStatus::Pending {
            return Err(DomainError::validation(format!(
                "new order {} must be pending, not {}",
                order.id(),
                order.status()
            )));
        }
        if store.order(order.id()).is_some() {
            return Err(DomainError::conflict(format!("order {} already exists", order.id())));
        }

        for line in order.items() {
            let available = match line.item() {
                ItemRef::Dish(id) => store.dish(id).map(|d| d.is_available()),
                ItemRef::Combo(id) => store.combo(id).map(|c| c.is_available()),
            };
            match available {
                None => return Err(DomainError::not_found(line.item().to_string())),
                Some(false) => {
                    return Err(DomainError::validation(format!(
                        "{} is not available",
                        line.item()
                    )));
                }
                Some(true) => {}
            }
        }

        let description = format!("Create order {} ({} items)", order.id(), order.items().len());
        Ok(Self {
            tally: SalesTally::of(order.items()),
            order,
            description,
            snapshot: None,
        })
    }

    pub fn order(&self) -> &Order {
        &self.order
    }
}

impl Command<CatalogStore> for CreateOrder {
    fn execute(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        let order_id = self.order.id();
        if store.order(order_id).is_some() {
            return Err(DomainError::conflict(format!("order {order_id} already exists")));
        }

        let resolved = fulfillment::resolve_items(store, self.order.items())?;
        if let Err(err) = fulfillment::check_stock(store, &resolved) {
            warn!(order_id = %order_id, error = %err, "order rejected");
            return Err(err);
        }
        self.tally.check_present(store)?;
        let snapshot = StockSnapshot::capture(store, &resolved)?;

        let total = self.order.final_amount()?;
        let mut placed = self.order.clone();
        placed.set_consumed(resolved.to_vec());

        fulfillment::consume(store, &resolved, Utc::now());
        self.tally.record(store);
        store.insert_order(placed);
        self.snapshot = Some(snapshot);

        info!(
            order_id = %order_id,
            items = self.order.items().len(),
            ingredients = resolved.len(),
            total = %total,
            "order fulfilled"
        );
        Ok(())
    }

    fn undo(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        let order_id = self.order.id();
        let snapshot = self
            .snapshot
            .as_ref()
            .ok_or_else(|| DomainError::invariant(format!("order {order_id} was never created")))?;
        if store.order(order_id).is_none() {
            return Err(DomainError::invariant(format!(
                "order {order_id} disappeared before it could be undone"
            )));
        }
        snapshot.check_restorable(store)?;
        self.tally.check_reversible(store)?;

        snapshot.restore(store);
        self.tally.reverse(store);
        store.remove_order(order_id);
        self.snapshot = None;
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::order::OrderItem;
    use crate::test_support::{kitchen_store, salt_and_soup};
    use larder_core::{ComboId, DishId, IngredientId, OrderId};

    fn soup_order(store: &CatalogStore, id: &str, servings: u32) -> Order {
        Order::new(
            id,
            vec![OrderItem::dish(store.dish(&DishId::new("SOUP")).unwrap(), servings)],
        )
    }

    fn salt(store: &CatalogStore) -> Decimal {
        store.ingredient(&IngredientId::new("SALT")).unwrap().quantity()
    }

    #[test]
    fn fulfilling_deducts_stock_and_records_sales() {
        let mut store = salt_and_soup();
        let mut cmd = CreateOrder::new(&store, soup_order(&store, "O1", 2)).unwrap();
        assert_eq!(cmd.description(), "Create order O1 (1 items)");

        cmd.execute(&mut store).unwrap();
        assert_eq!(salt(&store), Decimal::from(4));
        assert_eq!(store.dish(&DishId::new("SOUP")).unwrap().sales_count(), 2);
        let placed = store.order(&OrderId::new("O1")).unwrap();
        assert_eq!(
            placed.consumed(),
            &[crate::fulfillment::Requirement {
                ingredient_id: IngredientId::new("SALT"),
                quantity: Decimal::from(6),
            }]
        );
    }

    #[test]
    fn totals_past_the_decimal_range_are_refused_up_front() {
        let mut store = salt_and_soup();
        let price = Decimal::from_i128_with_scale(10_i128.pow(22), 0);
        let truffle = crate::dish::Dish::new("TRUFFLE", "Truffle", "Main", price).unwrap();
        crate::test_support::put(&mut store, truffle);
        let before = store.clone();

        let truffle = store.dish(&DishId::new("TRUFFLE")).unwrap();
        let order = Order::new("O1", vec![OrderItem::dish(truffle, 100_000_000)]);
        assert!(matches!(
            CreateOrder::new(&store, order),
            Err(DomainError::Validation(msg)) if msg.contains("out of range")
        ));
        assert_eq!(store, before);
    }

    #[test]
    fn insufficient_stock_leaves_catalog_untouched() {
        let mut store = salt_and_soup();
        let before = store.clone();
        let mut cmd = CreateOrder::new(&store, soup_order(&store, "O1", 4)).unwrap();

        let err = cmd.execute(&mut store).unwrap_err();
        assert_eq!(err.shortfall(), Some(Decimal::from(2)));
        assert_eq!(store, before);
    }

    #[test]
    fn undo_restores_stock_counters_and_removes_order() {
        let mut store = kitchen_store();
        let before = store.clone();
        let combo = store.combo(&ComboId::new("DUO")).unwrap();
        let order = Order::new("O1", vec![OrderItem::combo(combo, 1)]);
        let mut cmd = CreateOrder::new(&store, order).unwrap();

        cmd.execute(&mut store).unwrap();
        assert_eq!(salt(&store), Decimal::from(3));
        assert_eq!(store.combo(&ComboId::new("DUO")).unwrap().sales_count(), 1);

        cmd.undo(&mut store).unwrap();
        assert_eq!(store, before);

        cmd.redo(&mut store).unwrap();
        assert_eq!(salt(&store), Decimal::from(3));
    }

    #[test]
    fn duplicate_and_unknown_references_are_rejected_up_front() {
        let mut store = salt_and_soup();
        let mut first = CreateOrder::new(&store, soup_order(&store, "O1", 1)).unwrap();
        first.execute(&mut store).unwrap();

        assert!(matches!(
            CreateOrder::new(&store, soup_order(&store, "O1", 1)),
            Err(DomainError::Conflict(_))
        ));

        let kitchen = kitchen_store();
        let stew = kitchen.dish(&DishId::new("STEW")).unwrap();
        let order = Order::new("O2", vec![OrderItem::dish(stew, 1)]);
        assert!(matches!(
            CreateOrder::new(&store, order),
            Err(DomainError::NotFound(_))
        ));
    }
}
