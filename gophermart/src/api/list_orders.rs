use super::auth::authenticated;
use crate::{IdentityService, OrderError, OrderService};
use model::User;
use std::{convert::Infallible, sync::Arc};
use warp::{http::StatusCode, reply::Response, Filter, Rejection, Reply};

pub fn list_orders(
    identity: Arc<IdentityService>,
    orders: Arc<OrderService>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "user" / "orders")
        .and(warp::get())
        .and(authenticated(identity))
        .and_then(move |user: User| {
            let orders = orders.clone();
            async move { Ok::<_, Infallible>(super::with_vary(handle(&orders, user).await)) }
        })
}

async fn handle(orders: &OrderService, user: User) -> Response {
    match orders.list_orders(user.id).await {
        Ok(views) if views.is_empty() => {
            warp::reply::with_status(warp::reply::json(&views), StatusCode::NO_CONTENT).into_response()
        }
        Ok(views) => warp::reply::json(&views).into_response(),
        Err(OrderError::Internal(err)) => {
            tracing::error!(?err, "list_orders error");
            super::internal_error()
        }
        Err(OrderError::InvalidFormat) => unreachable!("list_orders performs no Luhn validation"),
    }
}
