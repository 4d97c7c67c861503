use super::auth::authenticated;
use crate::{IdentityService, LedgerError, LedgerService};
use model::{User, WithdrawRequest};
use std::{convert::Infallible, sync::Arc};
use warp::{http::StatusCode, reply::Response, Filter, Rejection, Reply};

pub fn withdraw(
    identity: Arc<IdentityService>,
    ledger: Arc<LedgerService>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "user" / "balance" / "withdraw")
        .and(warp::post())
        .and(authenticated(identity))
        .and(super::extract_json::<WithdrawRequest>())
        .and_then(move |user: User, request: WithdrawRequest| {
            let ledger = ledger.clone();
            async move { Ok::<_, Infallible>(super::with_vary(handle(&ledger, user, request).await)) }
        })
}

async fn handle(ledger: &LedgerService, user: User, request: WithdrawRequest) -> Response {
    match ledger.withdraw(user.id, &request.order, request.sum).await {
        Ok(_id) => super::json_error(StatusCode::OK, "Ok", "withdrawal recorded"),
        Err(LedgerError::InvalidOrderFormat) => super::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "InvalidOrderFormat",
            "order number is not a valid Luhn identifier",
        ),
        Err(LedgerError::InvalidSum) => {
            super::json_error(StatusCode::UNPROCESSABLE_ENTITY, "InvalidSum", "withdrawal sum must be positive")
        }
        Err(LedgerError::InsufficientFunds) => {
            super::json_error(StatusCode::PAYMENT_REQUIRED, "InsufficientFunds", "not enough points on the balance")
        }
        Err(LedgerError::Internal(err)) => {
            tracing::error!(?err, "withdraw error");
            super::internal_error()
        }
    }
}
