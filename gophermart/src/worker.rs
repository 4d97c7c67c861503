//! Drives every unfinished order to a terminal state by consulting the
//! external evaluator and settling the result atomically through the
//! store. Implements `shared::Maintaining` so it is driven by the same
//! `run_forever` ticker as any other periodic sweep.
use accrual_client::{AccrualError, AccrualEvaluator};
use anyhow::{Context, Result};
use database::{OrderSettlement, Store};
use model::Order;
use shared::maintenance::Maintaining;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

enum PollOutcome {
    NoChange,
    Settle(OrderSettlement),
    Backoff(Instant),
}

pub struct ReconciliationWorker {
    store: Arc<dyn Store>,
    accrual: Arc<dyn AccrualEvaluator>,
    call_timeout: Duration,
    /// Orders the evaluator rate-limited us on, keyed by order number, not to
    /// be retried before the recorded instant. Bounded by the number of
    /// currently-unfinished orders; not persisted, so it resets on restart.
    backoff: Mutex<HashMap<String, Instant>>,
}

impl ReconciliationWorker {
    pub fn new(store: Arc<dyn Store>, accrual: Arc<dyn AccrualEvaluator>, call_timeout: Duration) -> Self {
        Self {
            store,
            accrual,
            call_timeout,
            backoff: Mutex::new(HashMap::new()),
        }
    }

    async fn poll_one(&self, order: &Order) -> PollOutcome {
        let call = self.accrual.get_order_info(&order.order_number);
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(info)) if info.status == order.status => PollOutcome::NoChange,
            Ok(Ok(info)) => PollOutcome::Settle(OrderSettlement {
                order_number: order.order_number.clone(),
                status: info.status,
                accrual: info.accrual,
            }),
            Ok(Err(AccrualError::RateLimited { retry_after })) => {
                let delay = retry_after.unwrap_or(self.call_timeout);
                PollOutcome::Backoff(Instant::now() + delay)
            }
            Ok(Err(AccrualError::Other(err))) => {
                tracing::warn!(order_number = %order.order_number, %err, "accrual evaluator call failed, will retry next sweep");
                PollOutcome::NoChange
            }
            Err(_) => {
                tracing::warn!(order_number = %order.order_number, "accrual evaluator call timed out, will retry next sweep");
                PollOutcome::NoChange
            }
        }
    }
}

#[async_trait::async_trait]
impl Maintaining for ReconciliationWorker {
    fn name(&self) -> &str {
        "reconciliation_worker"
    }

    async fn run_maintenance(&self) -> Result<()> {
        let unfinished = self
            .store
            .list_unfinished_orders()
            .await
            .context("list_unfinished_orders")?;
        if unfinished.is_empty() {
            return Ok(());
        }

        let due: Vec<Order> = {
            let backoff = self.backoff.lock().await;
            let now = Instant::now();
            unfinished
                .into_iter()
                .filter(|order| backoff.get(&order.order_number).map_or(true, |until| *until <= now))
                .collect()
        };
        if due.is_empty() {
            return Ok(());
        }

        let outcomes = futures::future::join_all(due.iter().map(|order| self.poll_one(order))).await;
        for (order, outcome) in due.iter().zip(outcomes) {
            match outcome {
                PollOutcome::NoChange => {}
                PollOutcome::Settle(settlement) => {
                    if let Err(err) = self.store.settle_order(settlement).await {
                        tracing::error!(order_number = %order.order_number, ?err, "settle_order failed, will retry next sweep");
                    }
                }
                PollOutcome::Backoff(until) => {
                    self.backoff.lock().await.insert(order.order_number.clone(), until);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accrual_client::{MockAccrualEvaluator, OrderInfo};
    use bigdecimal::BigDecimal;
    use database::MockStore;
    use model::OrderStatus;

    fn sample_order(status: OrderStatus) -> Order {
        Order {
            order_number: "12345678903".into(),
            user_id: 1,
            status,
            accrual: BigDecimal::from(0),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn settles_when_the_evaluator_reports_a_new_terminal_status() {
        let mut store = MockStore::new();
        store
            .expect_list_unfinished_orders()
            .returning(|| Ok(vec![sample_order(OrderStatus::New)]));
        store
            .expect_settle_order()
            .withf(|settlement: &OrderSettlement| {
                settlement.status == OrderStatus::Processed && settlement.accrual == BigDecimal::from(100)
            })
            .returning(|_| Ok(()));

        let mut accrual = MockAccrualEvaluator::new();
        accrual.expect_get_order_info().returning(|order_number| {
            Ok(OrderInfo {
                order_number: order_number.to_string(),
                status: OrderStatus::Processed,
                accrual: BigDecimal::from(100),
            })
        });

        let worker = ReconciliationWorker::new(Arc::new(store), Arc::new(accrual), Duration::from_secs(1));
        worker.run_maintenance().await.unwrap();
    }

    #[tokio::test]
    async fn leaves_the_order_untouched_when_status_is_unchanged() {
        let mut store = MockStore::new();
        store
            .expect_list_unfinished_orders()
            .returning(|| Ok(vec![sample_order(OrderStatus::New)]));
        store.expect_settle_order().times(0);

        let mut accrual = MockAccrualEvaluator::new();
        accrual.expect_get_order_info().returning(|order_number| {
            Ok(OrderInfo {
                order_number: order_number.to_string(),
                status: OrderStatus::New,
                accrual: BigDecimal::from(0),
            })
        });

        let worker = ReconciliationWorker::new(Arc::new(store), Arc::new(accrual), Duration::from_secs(1));
        worker.run_maintenance().await.unwrap();
    }

    #[tokio::test]
    async fn an_empty_unfinished_set_never_calls_the_evaluator() {
        let mut store = MockStore::new();
        store.expect_list_unfinished_orders().returning(|| Ok(vec![]));

        let mut accrual = MockAccrualEvaluator::new();
        accrual.expect_get_order_info().times(0);

        let worker = ReconciliationWorker::new(Arc::new(store), Arc::new(accrual), Duration::from_secs(1));
        worker.run_maintenance().await.unwrap();
    }
}
