use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An append-only record of a balance spend. `order_number` need not
/// reference a row in `orders` — withdrawals are recorded against any
/// Luhn-valid number.
#[derive(Clone, Debug, PartialEq)]
pub struct Withdrawal {
    pub id: i64,
    pub user_id: i64,
    pub order_number: String,
    pub sum: BigDecimal,
    pub processed_at: DateTime<Utc>,
}

/// The shape returned by `GET /api/user/withdrawals`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WithdrawalView {
    pub order: String,
    #[serde(serialize_with = "crate::decimal_as_number::serialize")]
    pub sum: BigDecimal,
    pub processed_at: DateTime<Utc>,
}

impl From<Withdrawal> for WithdrawalView {
    fn from(w: Withdrawal) -> Self {
        WithdrawalView {
            order: w.order_number,
            sum: w.sum,
            processed_at: w.processed_at,
        }
    }
}

/// The body of `POST /api/user/balance/withdraw`.
#[derive(Clone, Debug, Deserialize)]
pub struct WithdrawRequest {
    pub order: String,
    pub sum: BigDecimal,
}
