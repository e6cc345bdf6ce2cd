use chrono::{DateTime, Utc};
use tracing::info;

use larder_core::{DomainError, DomainResult, OrderId};
use larder_history::Command;

use crate::commands::sales::SalesTally;
use crate::fulfillment::{self, ResolvedRequirements, StockSnapshot};
use crate::order::OrderStatus;
use crate::store::CatalogStore;

/// Cancel an open order. The stock recorded as consumed when the order was
/// placed goes back on the shelf and its sales come off the counters; the
/// order stays on record as `Cancelled`.
///
/// Later recipe edits do not change what is returned. Ingredients, dishes and
/// combos deleted since the order was placed are skipped.
#[derive(Debug, Clone)]
pub struct CancelOrder {
    order_id: OrderId,
    description: String,
    applied: Option<Applied>,
}

#[derive(Debug, Clone)]
struct Applied {
    snapshot: StockSnapshot,
    tally: SalesTally,
    status: OrderStatus,
    completed_at: Option<DateTime<Utc>>,
}

impl CancelOrder {
    pub fn new(store: &CatalogStore, order_id: OrderId) -> DomainResult<Self> {
        let order = store
            .order(&order_id)
            .ok_or_else(|| DomainError::not_found(format!("order {order_id}")))?;
        if !order.status().can_transition_to(OrderStatus::Cancelled) {
            return Err(DomainError::validation(format!(
                "order {order_id} is {} and cannot be cancelled",
                order.status()
            )));
        }

        let description = format!("Cancel order {order_id}");
        Ok(Self {
            order_id,
            description,
            applied: None,
        })
    }
}

impl Command<CatalogStore> for CancelOrder {
    fn execute(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        let order = store
            .order(&self.order_id)
            .ok_or_else(|| DomainError::not_found(format!("order {}", self.order_id)))?;
        if !order.status().can_transition_to(OrderStatus::Cancelled) {
            return Err(DomainError::validation(format!(
                "order {} is {} and cannot be cancelled",
                self.order_id,
                order.status()
            )));
        }

        let still_stocked: Vec<_> = order
            .consumed()
            .iter()
            .filter(|req| store.ingredient(&req.ingredient_id).is_some())
            .cloned()
            .collect();
        let resolved = ResolvedRequirements::from_requirements(&still_stocked)?;
        let tally = SalesTally::of(order.items()).present_in(store);
        tally.check_reversible(store)?;
        let applied = Applied {
            snapshot: StockSnapshot::capture(store, &resolved)?,
            tally,
            status: order.status(),
            completed_at: order.completed_at(),
        };

        fulfillment::replenish(store, &resolved, Utc::now())?;
        applied.tally.reverse(store);
        if let Some(order) = store.order_mut(&self.order_id) {
            order.set_status(OrderStatus::Cancelled, None);
        }
        self.applied = Some(applied);

        info!(order_id = %self.order_id, ingredients = resolved.len(), "order cancelled");
        Ok(())
    }

    fn undo(&mut self, store: &mut CatalogStore) -> DomainResult<()> {
        let applied = self
            .applied
            .as_ref()
            .ok_or_else(|| DomainError::invariant(format!("order {} was never cancelled", self.order_id)))?;
        if store.order(&self.order_id).is_none() {
            return Err(DomainError::invariant(format!(
                "order {} disappeared before its cancellation could be undone",
                self.order_id
            )));
        }
        applied.snapshot.check_restorable(store)?;
        applied.tally.check_present(store)?;

        applied.snapshot.restore(store);
        applied.tally.record(store);
        if let Some(order) = store.order_mut(&self.order_id) {
            order.set_status(applied.status, applied.completed_at);
        }
        self.applied = None;
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
