use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use larder_core::{ComboId, DishId, DomainError, DomainResult, Entity, OrderId};

use crate::combo::Combo;
use crate::dish::Dish;
use crate::fulfillment::Requirement;

/// Order status lifecycle.
///
/// `Pending -> Processing -> Completed`, and any state other than `Completed`
/// may move to `Cancelled`. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Completed)
                | (Processing, Completed)
                | (Pending, Cancelled)
                | (Processing, Cancelled)
        )
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an order line refers to: a single dish or a combo, never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ItemRef {
    Dish(DishId),
    Combo(ComboId),
}

impl core::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ItemRef::Dish(id) => write!(f, "dish {id}"),
            ItemRef::Combo(id) => write!(f, "combo {id}"),
        }
    }
}

/// Order line: reference, quantity, and the unit price and name at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    item: ItemRef,
    quantity: u32,
    unit_price: Decimal,
    name: String,
}

impl OrderItem {
    /// Line for `quantity` servings of `dish` at its current price.
    pub fn dish(dish: &Dish, quantity: u32) -> Self {
        Self {
            item: ItemRef::Dish(dish.id().clone()),
            quantity,
            unit_price: dish.price(),
            name: dish.name().to_string(),
        }
    }

    /// Line for `quantity` of `combo` at its current discounted price.
    pub fn combo(combo: &Combo, quantity: u32) -> Self {
        Self {
            item: ItemRef::Combo(combo.id().clone()),
            quantity,
            unit_price: combo.final_price(),
            name: combo.name().to_string(),
        }
    }

    pub fn item(&self) -> &ItemRef {
        &self.item
    }

    pub fn is_combo(&self) -> bool {
        matches!(self.item, ItemRef::Combo(_))
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price times quantity. Fails if the product is not representable.
    pub fn line_total(&self) -> DomainResult<Decimal> {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| DomainError::out_of_range(format!("line total for {}", self.item)))
    }
}

/// A customer order.
///
/// Items are fixed once the order exists; only the status commands touch an
/// order after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    items: Vec<OrderItem>,
    status: OrderStatus,
    discount: Decimal,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    /// Stock taken when the order was fulfilled, per ingredient.
    #[serde(default)]
    consumed: Vec<Requirement>,
}

impl Order {
    /// A new pending order.
    pub fn new(id: impl Into<OrderId>, items: Vec<OrderItem>) -> Self {
        Self {
            id: id.into(),
            items,
            status: OrderStatus::Pending,
            discount: Decimal::ZERO,
            created_at: Utc::now(),
            completed_at: None,
            consumed: Vec::new(),
        }
    }

    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = discount;
        self
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Ingredient quantities deducted when this order was fulfilled. Empty
    /// until the order has been created in a catalog.
    pub fn consumed(&self) -> &[Requirement] {
        &self.consumed
    }

    /// Sum of line totals.
    pub fn total(&self) -> DomainResult<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |total, line| {
            total
                .checked_add(line.line_total()?)
                .ok_or_else(|| DomainError::out_of_range(format!("total of order {}", self.id)))
        })
    }

    /// Total after discount.
    pub fn final_amount(&self) -> DomainResult<Decimal> {
        Ok(self.total()? - self.discount)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainError::validation("order id cannot be empty"));
        }
        if self.items.is_empty() {
            return Err(DomainError::validation(format!(
                "order {} has no items",
                self.id
            )));
        }
        if let Some(line) = self.items.iter().find(|line| line.quantity == 0) {
            return Err(DomainError::validation(format!(
                "order {} has a zero quantity line for {}",
                self.id, line.item
            )));
        }
        if self.discount < Decimal::ZERO || self.discount > self.total()? {
            return Err(DomainError::validation(format!(
                "order {} discount must be between 0 and the order total",
                self.id
            )));
        }
        Ok(())
    }

    pub(crate) fn set_consumed(&mut self, consumed: Vec<Requirement>) {
        self.consumed = consumed;
    }

    pub(crate) fn set_status(&mut self, status: OrderStatus, completed_at: Option<DateTime<Utc>>) {
        self.status = status;
        self.completed_at = completed_at;
    }
}

impl Entity for Order {
    type Id = OrderId;

    const KIND: &'static str = "order";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soup() -> Dish {
        Dish::new("SOUP", "Soup", "Main", Decimal::from(50000)).unwrap()
    }

    #[test]
    fn totals_follow_line_snapshots() {
        let order = Order::new("O1", vec![OrderItem::dish(&soup(), 2)])
            .with_discount(Decimal::from(10000));

        assert_eq!(order.total(), Ok(Decimal::from(100000)));
        assert_eq!(order.final_amount(), Ok(Decimal::from(90000)));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(order.validate().is_ok());
    }

    #[test]
    fn discount_above_total_is_rejected() {
        let order = Order::new("O1", vec![OrderItem::dish(&soup(), 1)])
            .with_discount(Decimal::from(60000));
        assert!(matches!(order.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn oversized_totals_are_rejected_not_panicking() {
        let caviar = Dish::new("CAVIAR", "Caviar", "Main", Decimal::MAX).unwrap();
        let order = Order::new("O1", vec![OrderItem::dish(&caviar, 100_000_000)]);

        assert!(matches!(
            order.total(),
            Err(DomainError::Validation(msg)) if msg.contains("out of range")
        ));
        assert!(order.validate().is_err());

        let two_lines = Order::new(
            "O2",
            vec![OrderItem::dish(&caviar, 1), OrderItem::dish(&caviar, 1)],
        );
        assert!(two_lines.total().is_err());
    }

    #[test]
    fn empty_and_zero_quantity_orders_are_rejected() {
        assert!(Order::new("O1", Vec::new()).validate().is_err());
        assert!(Order::new("O1", vec![OrderItem::dish(&soup(), 0)]).validate().is_err());
    }

    #[test]
    fn status_lifecycle() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Processing.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Processing));
        assert!(!Pending.can_transition_to(Pending));
        assert!(Completed.is_terminal());
    }

    #[test]
    fn item_ref_serializes_with_kind_tag() {
        let json = serde_json::to_string(&ItemRef::Combo(ComboId::new("LUNCH"))).unwrap();
        assert_eq!(json, r#"{"kind":"combo","id":"LUNCH"}"#);
    }
}
