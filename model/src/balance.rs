use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row per user. `current = sum(PROCESSED accrual) - sum(withdrawals)`
/// and `withdrawn = sum(withdrawals)`; both invariants are maintained by the
/// store transactionally (see `database::balances`), never recomputed here.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Balance {
    #[serde(serialize_with = "crate::decimal_as_number::serialize")]
    pub current: BigDecimal,
    #[serde(serialize_with = "crate::decimal_as_number::serialize")]
    pub withdrawn: BigDecimal,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}
