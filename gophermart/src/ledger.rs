//! Balance retrieval and withdrawal validation/recording.
use bigdecimal::BigDecimal;
use database::Store;
use model::{Balance, WithdrawalView};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("order number is not a valid Luhn identifier")]
    InvalidOrderFormat,
    #[error("withdrawal sum must be positive")]
    InvalidSum,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<database::StoreError> for LedgerError {
    fn from(err: database::StoreError) -> Self {
        match err {
            database::StoreError::DuplicateLogin => {
                LedgerError::Internal(anyhow::anyhow!("unexpected DuplicateLogin from ledger store call"))
            }
            database::StoreError::Other(err) => LedgerError::Internal(err.into()),
        }
    }
}

impl From<database::WithdrawError> for LedgerError {
    fn from(err: database::WithdrawError) -> Self {
        match err {
            database::WithdrawError::InsufficientFunds => LedgerError::InsufficientFunds,
            database::WithdrawError::Other(err) => LedgerError::Internal(err.into()),
        }
    }
}

pub struct LedgerService {
    store: Arc<dyn Store>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get_balance(&self, user_id: i64) -> Result<Balance, LedgerError> {
        Ok(self.store.get_balance(user_id).await?)
    }

    /// Validates the order number and sum before the store even locks the
    /// balance row, so a malformed request never takes the lock.
    pub async fn withdraw(
        &self,
        user_id: i64,
        order_number: &str,
        sum: BigDecimal,
    ) -> Result<i64, LedgerError> {
        if !model::luhn::is_valid_order_number(order_number) {
            return Err(LedgerError::InvalidOrderFormat);
        }
        if sum <= BigDecimal::from(0) {
            return Err(LedgerError::InvalidSum);
        }
        Ok(self.store.withdraw(user_id, order_number, sum).await?)
    }

    /// Ordered by `processed_at` ascending.
    pub async fn list_withdrawals(&self, user_id: i64) -> Result<Vec<WithdrawalView>, LedgerError> {
        let withdrawals = self.store.list_withdrawals(user_id).await?;
        Ok(withdrawals.into_iter().map(WithdrawalView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::MockStore;

    #[tokio::test]
    async fn rejects_non_positive_sum() {
        let store = MockStore::new();
        let service = LedgerService::new(Arc::new(store));
        let result = service
            .withdraw(1, "4561261212345467", BigDecimal::from(0))
            .await;
        assert!(matches!(result, Err(LedgerError::InvalidSum)));
    }

    #[tokio::test]
    async fn rejects_bad_order_number_before_touching_the_store() {
        let store = MockStore::new();
        let service = LedgerService::new(Arc::new(store));
        let result = service
            .withdraw(1, "23772224", BigDecimal::from(10))
            .await;
        assert!(matches!(result, Err(LedgerError::InvalidOrderFormat)));
    }

    #[tokio::test]
    async fn surfaces_insufficient_funds() {
        let mut store = MockStore::new();
        store
            .expect_withdraw()
            .returning(|_, _, _| Err(database::WithdrawError::InsufficientFunds));
        let service = LedgerService::new(Arc::new(store));
        let result = service
            .withdraw(1, "4561261212345467", BigDecimal::from(200))
            .await;
        assert!(matches!(result, Err(LedgerError::InsufficientFunds)));
    }
}
