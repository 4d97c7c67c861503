use super::auth::authenticated;
use crate::{IdentityService, LedgerError, LedgerService};
use model::User;
use std::{convert::Infallible, sync::Arc};
use warp::{http::StatusCode, reply::Response, Filter, Rejection, Reply};

pub fn list_withdrawals(
    identity: Arc<IdentityService>,
    ledger: Arc<LedgerService>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "user" / "withdrawals")
        .and(warp::get())
        .and(authenticated(identity))
        .and_then(move |user: User| {
            let ledger = ledger.clone();
            async move { Ok::<_, Infallible>(super::with_vary(handle(&ledger, user).await)) }
        })
}

async fn handle(ledger: &LedgerService, user: User) -> Response {
    match ledger.list_withdrawals(user.id).await {
        Ok(views) if views.is_empty() => {
            warp::reply::with_status(warp::reply::json(&views), StatusCode::NO_CONTENT).into_response()
        }
        Ok(views) => warp::reply::json(&views).into_response(),
        Err(LedgerError::Internal(err)) => {
            tracing::error!(?err, "list_withdrawals error");
            super::internal_error()
        }
        Err(_) => unreachable!("list_withdrawals performs no input validation"),
    }
}
