use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an order. Advances only along the partial order
/// `NEW -> PROCESSING -> {PROCESSED, INVALID}`; `NEW -> {PROCESSED, INVALID}`
/// directly is permitted when the accrual evaluator skips `PROCESSING`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    New,
    Processing,
    Invalid,
    Processed,
}

impl OrderStatus {
    /// Orders in `NEW` or `PROCESSING` are the ones the reconciliation
    /// worker still has to drive to a terminal state.
    pub fn is_unfinished(self) -> bool {
        matches!(self, OrderStatus::New | OrderStatus::Processing)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Invalid | OrderStatus::Processed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::New => "NEW",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Invalid => "INVALID",
            OrderStatus::Processed => "PROCESSED",
        };
        f.write_str(s)
    }
}

/// A purchase order identified by `order_number`, globally unique across all
/// users and Luhn-valid (see [`crate::luhn`]).
#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub order_number: String,
    pub user_id: i64,
    pub status: OrderStatus,
    pub accrual: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The shape returned by `GET /api/user/orders`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserOrderView {
    pub number: String,
    pub status: OrderStatus,
    #[serde(serialize_with = "crate::decimal_as_number::serialize")]
    pub accrual: BigDecimal,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Order> for UserOrderView {
    fn from(order: Order) -> Self {
        UserOrderView {
            number: order.order_number,
            status: order.status,
            accrual: order.accrual,
            uploaded_at: order.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfinished_classification() {
        assert!(OrderStatus::New.is_unfinished());
        assert!(OrderStatus::Processing.is_unfinished());
        assert!(!OrderStatus::Processed.is_unfinished());
        assert!(!OrderStatus::Invalid.is_unfinished());
    }

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"PROCESSING\"");
    }
}
