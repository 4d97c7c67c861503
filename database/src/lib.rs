//! The persistence layer. [`Store`] is the narrow transactional contract
//! the services consume; [`PostgresStore`] is its only production
//! implementation, a thin wrapper around a lazily-connected `sqlx::PgPool`.
//! The implementation is split across modules by concern, each writing
//! hand-rolled SQL — no query builder, `const QUERY: &str` plus
//! `sqlx::query(...)`.
mod balances;
mod errors;
mod orders;
mod users;

pub use errors::{StoreError, WithdrawError};
pub use orders::RegistrationOutcome;

use anyhow::Result;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use model::{Balance, Order, User, Withdrawal};
use sqlx::PgPool;

#[mockall::automock]
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user_with_balance(
        &self,
        login: &str,
        password_hash: &str,
    ) -> Result<User, StoreError>;
    async fn get_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn upsert_session(&self, session: NewSession) -> Result<(), StoreError>;

    async fn register_order(
        &self,
        user_id: i64,
        order_number: &str,
    ) -> Result<RegistrationOutcome, StoreError>;
    async fn list_orders_by_user(&self, user_id: i64) -> Result<Vec<Order>, StoreError>;
    async fn list_unfinished_orders(&self) -> Result<Vec<Order>, StoreError>;
    async fn settle_order(&self, settlement: OrderSettlement) -> Result<(), StoreError>;

    async fn get_balance(&self, user_id: i64) -> Result<Balance, StoreError>;
    async fn withdraw(
        &self,
        user_id: i64,
        order_number: &str,
        sum: BigDecimal,
    ) -> Result<i64, WithdrawError>;
    async fn list_withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, StoreError>;
}

/// Parameters for [`Store::upsert_session`].
#[derive(Clone, Debug)]
pub struct NewSession {
    pub user_id: i64,
    pub refresh_token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

/// Parameters for [`Store::settle_order`], the write side of the
/// reconciliation worker's settlement transaction.
#[derive(Clone, Debug)]
pub struct OrderSettlement {
    pub order_number: String,
    pub status: model::OrderStatus,
    pub accrual: BigDecimal,
}

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(database_uri: &str) -> Result<Self> {
        Ok(Self {
            pool: PgPool::connect_lazy(database_uri)?,
        })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Deletes all data. Only used by tests.
    pub async fn clear(&self) -> Result<()> {
        use sqlx::Executor;
        self.pool
            .execute("TRUNCATE users, session_tokens, orders, user_loyalty_points, user_withdrawals RESTART IDENTITY CASCADE;")
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn create_user_with_balance(
        &self,
        login: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        users::create_user_with_balance(&self.pool, login, password_hash).await
    }

    async fn get_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        users::get_user_by_login(&self.pool, login).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        users::get_user_by_id(&self.pool, id).await
    }

    async fn upsert_session(&self, session: NewSession) -> Result<(), StoreError> {
        users::upsert_session(&self.pool, session).await
    }

    async fn register_order(
        &self,
        user_id: i64,
        order_number: &str,
    ) -> Result<RegistrationOutcome, StoreError> {
        orders::register_order(&self.pool, user_id, order_number).await
    }

    async fn list_orders_by_user(&self, user_id: i64) -> Result<Vec<Order>, StoreError> {
        orders::list_orders_by_user(&self.pool, user_id).await
    }

    async fn list_unfinished_orders(&self) -> Result<Vec<Order>, StoreError> {
        orders::list_unfinished_orders(&self.pool).await
    }

    async fn settle_order(&self, settlement: OrderSettlement) -> Result<(), StoreError> {
        orders::settle_order(&self.pool, settlement).await
    }

    async fn get_balance(&self, user_id: i64) -> Result<Balance, StoreError> {
        balances::get_balance(&self.pool, user_id).await
    }

    async fn withdraw(
        &self,
        user_id: i64,
        order_number: &str,
        sum: BigDecimal,
    ) -> Result<i64, WithdrawError> {
        balances::withdraw(&self.pool, user_id, order_number, sum).await
    }

    async fn list_withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, StoreError> {
        balances::list_withdrawals(&self.pool, user_id).await
    }
}
