//! Order registration (idempotency + conflict classification) and
//! user-scoped listing. Validation lives here; the locking and conflict
//! classification itself lives in `database::orders`, behind the `Store`
//! trait.
use database::{RegistrationOutcome, Store};
use model::UserOrderView;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order number is not a valid Luhn identifier")]
    InvalidFormat,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<database::StoreError> for OrderError {
    fn from(err: database::StoreError) -> Self {
        match err {
            database::StoreError::DuplicateLogin => {
                OrderError::Internal(anyhow::anyhow!("unexpected DuplicateLogin from order store call"))
            }
            database::StoreError::Other(err) => OrderError::Internal(err.into()),
        }
    }
}

pub struct OrderService {
    store: Arc<dyn Store>,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Validates the order number, then delegates to the store; the HTTP
    /// layer maps [`RegistrationOutcome`] to the 200/202/409 status codes.
    pub async fn register_order(
        &self,
        user_id: i64,
        order_number: &str,
    ) -> Result<RegistrationOutcome, OrderError> {
        if !model::luhn::is_valid_order_number(order_number) {
            return Err(OrderError::InvalidFormat);
        }
        Ok(self.store.register_order(user_id, order_number).await?)
    }

    /// Ordered by creation time descending.
    pub async fn list_orders(&self, user_id: i64) -> Result<Vec<UserOrderView>, OrderError> {
        let orders = self.store.list_orders_by_user(user_id).await?;
        Ok(orders.into_iter().map(UserOrderView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::MockStore;

    #[tokio::test]
    async fn rejects_non_luhn_order_numbers_before_touching_the_store() {
        let store = MockStore::new();
        let service = OrderService::new(Arc::new(store));
        let result = service.register_order(1, "23772224").await;
        assert!(matches!(result, Err(OrderError::InvalidFormat)));
    }

    #[tokio::test]
    async fn accepted_outcome_passes_through() {
        let mut store = MockStore::new();
        store
            .expect_register_order()
            .returning(|_, _| Ok(RegistrationOutcome::Accepted));
        let service = OrderService::new(Arc::new(store));
        let outcome = service.register_order(1, "12345678903").await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::Accepted);
    }
}
