use super::auth::authenticated;
use crate::{IdentityService, LedgerError, LedgerService};
use model::User;
use std::{convert::Infallible, sync::Arc};
use warp::{reply::Response, Filter, Rejection, Reply};

pub fn get_balance(
    identity: Arc<IdentityService>,
    ledger: Arc<LedgerService>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "user" / "balance")
        .and(warp::get())
        .and(authenticated(identity))
        .and_then(move |user: User| {
            let ledger = ledger.clone();
            async move { Ok::<_, Infallible>(super::with_vary(handle(&ledger, user).await)) }
        })
}

async fn handle(ledger: &LedgerService, user: User) -> Response {
    match ledger.get_balance(user.id).await {
        Ok(balance) => warp::reply::json(&balance).into_response(),
        Err(LedgerError::Internal(err)) => {
            tracing::error!(?err, "get_balance error");
            super::internal_error()
        }
        Err(_) => unreachable!("get_balance performs no input validation"),
    }
}
