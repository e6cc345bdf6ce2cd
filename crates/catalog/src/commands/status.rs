use chrono::{DateTime, Utc};

use larder_core::{DomainError, DomainResult, OrderId};
use larder_history::Command;

use crate::order::OrderStatus;
use crate::store::CatalogStore;

/// Move an order along its lifecycle.
///
/// Only the status changes. Setting `Cancelled` here leaves stock and sales
/// counters alone; [`super::CancelOrder`] also reverses them.
#[derive(Debug, Clone)]
pub struct SetOrderStatus {
    order_id: OrderId,
    status: OrderStatus,
    description: String,
    before: Option<(OrderStatus, Option<DateTime<Utc>>)>,
}

impl SetOrderStatus {
    pub fn new(store: &CatalogStore, order_id: OrderId, status: OrderStatus) -> DomainResult<Self> {
        let order = store
            .order(&order_id)
            .ok_or_else(|| DomainError::not_found(format!("order {order_id}")))?;
        check_transition(&order_id, order.status(), status)?;

        let description = format!("Set order {order_id} status to {status}");
        Ok(Self {
            order_id,
            status,
            description,
            before: None,
        })
    }
}

fn check_transition(id: &OrderId, from: OrderStatus, to: OrderStatus) -> DomainResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "order {id} cannot move from {from} to {to}"
        )))
    }
}

impl Command<CatalogStore> for SetOrderStatus {
    fn execute(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        let order = store
            .order_mut(&self.order_id)
            .ok_or_else(|| DomainError::not_found(format!("order {}", self.order_id)))?;
        check_transition(&self.order_id, order.status(), self.status)?;

        self.before = Some((order.status(), order.completed_at()));
        let completed_at = match self.status {
            OrderStatus::Completed => Some(Utc::now()),
            _ => order.completed_at(),
        };
        order.set_status(self.status, completed_at);
        Ok(())
    }

    fn undo(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        let (status, completed_at) = self
            .before
            .ok_or_else(|| DomainError::invariant("status change was never executed"))?;
        let order = store
            .order_mut(&self.order_id)
            .ok_or_else(|| DomainError::not_found(format!("order {}", self.order_id)))?;

        order.set_status(status, completed_at);
        self.before = None;
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CreateOrder;
    use crate::order::{Order, OrderItem};
    use crate::test_support::salt_and_soup;
    use larder_core::DishId;

    fn store_with_order() -> CatalogStore {
        let mut store = salt_and_soup();
        let soup = store.dish(&DishId::new("SOUP")).unwrap();
        let order = Order::new("O1", vec![OrderItem::dish(soup, 1)]);
        CreateOrder::new(&store, order)
            .unwrap()
            .execute(&mut store)
            .unwrap();
        store
    }

    #[test]
    fn completing_stamps_and_undo_clears() {
        let mut store = store_with_order();
        let id = OrderId::new("O1");

        let mut cmd = SetOrderStatus::new(&store, id.clone(), OrderStatus::Completed).unwrap();
        cmd.execute(&mut store).unwrap();
        let order = store.order(&id).unwrap();
        assert_eq!(order.status(), OrderStatus::Completed);
        assert!(order.completed_at().is_some());

        cmd.undo(&mut store).unwrap();
        let order = store.order(&id).unwrap();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.completed_at(), None);
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let mut store = store_with_order();
        let id = OrderId::new("O1");
        SetOrderStatus::new(&store, id.clone(), OrderStatus::Completed)
            .unwrap()
            .execute(&mut store)
            .unwrap();

        assert!(SetOrderStatus::new(&store, id.clone(), OrderStatus::Processing).is_err());
        assert!(SetOrderStatus::new(&store, id, OrderStatus::Cancelled).is_err());
    }

    #[test]
    fn status_cancel_keeps_stock_deducted() {
        let mut store = store_with_order();
        let id = OrderId::new("O1");
        let salt = larder_core::IngredientId::new("SALT");
        let on_hand = store.ingredient(&salt).unwrap().quantity();

        let mut cmd = SetOrderStatus::new(&store, id.clone(), OrderStatus::Cancelled).unwrap();
        cmd.execute(&mut store).unwrap();
        assert_eq!(store.order(&id).unwrap().status(), OrderStatus::Cancelled);
        assert_eq!(store.ingredient(&salt).unwrap().quantity(), on_hand);
        assert_eq!(cmd.description(), "Set order O1 status to cancelled");
    }
}
