//! Client for the external accrual evaluator: a single `GET` per order
//! number, bounded by a per-call timeout independent of the ambient
//! cancellation token. Non-200 responses are always transient from our
//! point of view — the worker just leaves the order unfinished and tries
//! again on the next sweep.
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use model::OrderStatus;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccrualError {
    #[error("accrual evaluator rate limited the request, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },
    #[error("accrual evaluator returned an unexpected response")]
    Other(#[from] anyhow::Error),
}

/// The evaluator's view of an order, already translated into our status
/// vocabulary (`REGISTERED` becomes [`OrderStatus::New`]).
#[derive(Clone, Debug, PartialEq)]
pub struct OrderInfo {
    pub order_number: String,
    pub status: OrderStatus,
    pub accrual: BigDecimal,
}

#[mockall::automock]
#[async_trait]
pub trait AccrualEvaluator: Send + Sync {
    async fn get_order_info(&self, order_number: &str) -> Result<OrderInfo, AccrualError>;
}

pub struct AccrualClient {
    client: Client,
    base_url: reqwest::Url,
}

impl AccrualClient {
    pub fn new(base_url: reqwest::Url, timeout: Duration) -> Self {
        Self {
            client: shared::http_client(timeout),
            base_url,
        }
    }
}

#[async_trait]
impl AccrualEvaluator for AccrualClient {
    async fn get_order_info(&self, order_number: &str) -> Result<OrderInfo, AccrualError> {
        let url = self
            .base_url
            .join(&format!("api/orders/{order_number}"))
            .map_err(|err| AccrualError::Other(err.into()))?;

        tracing::debug!(%url, "querying accrual evaluator");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| AccrualError::Other(err.into()))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(AccrualError::RateLimited { retry_after });
        }
        if response.status() != StatusCode::OK {
            return Err(AccrualError::Other(anyhow::anyhow!(
                "accrual evaluator responded with status {}",
                response.status()
            )));
        }

        let body: AccrualResponse = response
            .json()
            .await
            .map_err(|err| AccrualError::Other(err.into()))?;
        Ok(body.into())
    }
}

#[derive(Debug, Deserialize)]
struct AccrualResponse {
    order: String,
    status: AccrualStatus,
    #[serde(default)]
    accrual: Option<BigDecimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
enum AccrualStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}

impl From<AccrualResponse> for OrderInfo {
    fn from(response: AccrualResponse) -> Self {
        let status = match response.status {
            AccrualStatus::Registered => OrderStatus::New,
            AccrualStatus::Processing => OrderStatus::Processing,
            AccrualStatus::Invalid => OrderStatus::Invalid,
            AccrualStatus::Processed => OrderStatus::Processed,
        };
        OrderInfo {
            order_number: response.order,
            status,
            accrual: response.accrual.unwrap_or_else(|| BigDecimal::from(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_maps_to_new() {
        let response = AccrualResponse {
            order: "12345678903".into(),
            status: AccrualStatus::Registered,
            accrual: None,
        };
        let info: OrderInfo = response.into();
        assert_eq!(info.status, OrderStatus::New);
        assert_eq!(info.accrual, BigDecimal::from(0));
    }

    #[test]
    fn processed_carries_its_accrual() {
        let response = AccrualResponse {
            order: "12345678903".into(),
            status: AccrualStatus::Processed,
            accrual: Some(BigDecimal::from(500)),
        };
        let info: OrderInfo = response.into();
        assert_eq!(info.status, OrderStatus::Processed);
        assert_eq!(info.accrual, BigDecimal::from(500));
    }
}
