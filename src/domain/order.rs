use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub delivery_agent_id: Option<Uuid>,
    pub status: OrderStatus,
    pub total_price_cents: i64,
    pub shipping_address: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub plant_id: Uuid,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl OrderItem {
    pub fn subtotal_cents(&self) -> i64 {
        self.unit_price_cents.saturating_mul(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

/// Legal transitions as (from-set, to). Anything not listed is rejected.
const TRANSITIONS: &[(&[OrderStatus], OrderStatus)] = &[
    (&[OrderStatus::Pending], OrderStatus::Confirmed),
    (&[OrderStatus::Confirmed], OrderStatus::Shipped),
    (&[OrderStatus::Shipped], OrderStatus::Delivered),
    (&[OrderStatus::Pending, OrderStatus::Confirmed], OrderStatus::Cancelled),
];

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Statuses a delivery agent may be assigned from. Assignment forces `Confirmed`.
    pub const ASSIGNABLE: &'static [OrderStatus] = &[OrderStatus::Pending, OrderStatus::Confirmed];

    /// Assignment leaves the order confirmed, so completion accepts it as well as shipped.
    pub const COMPLETABLE: &'static [OrderStatus] = &[OrderStatus::Confirmed, OrderStatus::Shipped];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Statuses from which `target` may be entered.
    pub fn sources_of(target: OrderStatus) -> &'static [OrderStatus] {
        TRANSITIONS
            .iter()
            .find(|(_, to)| *to == target)
            .map(|(from, _)| *from)
            .unwrap_or(&[])
    }

    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        Self::sources_of(target).contains(self)
    }

    pub fn is_cancellable(&self) -> bool {
        self.can_transition_to(OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cod,
    Razorpay,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub shipping_address: String,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemInput {
    pub plant_id: Uuid,
    #[validate(range(min = 1, max = 1000, message = "must be between 1 and 1000"))]
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub seller_id: Uuid,
    #[validate(length(min = 1, message = "must contain at least one item"), nested)]
    pub items: Vec<OrderItemInput>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub shipping_address: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOrderSummary {
    pub order_id: Uuid,
    pub seller_id: Uuid,
    pub total_price_cents: i64,
    pub status: OrderStatus,
}

impl From<&Order> for CheckoutOrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            seller_id: order.seller_id,
            total_price_cents: order.total_price_cents,
            status: order.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub orders: Vec<CheckoutOrderSummary>,
    pub payment_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_payload: Option<serde_json::Value>,
}

/// Buyer- or seller-scoped order counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    pub total_revenue_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_backward_and_skipping_transitions_rejected() {
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_cancellation_only_from_early_states() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Confirmed.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert!(!OrderStatus::Delivered.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn test_nothing_enters_pending() {
        assert!(OrderStatus::sources_of(OrderStatus::Pending).is_empty());
    }

    #[test]
    fn test_status_names() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::from_str("refunded"), None);
    }
}
