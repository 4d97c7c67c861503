use super::auth::authenticated;
use crate::{IdentityService, OrderError, OrderService};
use database::RegistrationOutcome;
use model::User;
use std::{convert::Infallible, sync::Arc};
use warp::{http::StatusCode, reply::Response, Filter, Rejection, Reply};

pub fn create_order(
    identity: Arc<IdentityService>,
    orders: Arc<OrderService>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "user" / "orders")
        .and(warp::post())
        .and(authenticated(identity))
        .and(super::extract_text_order_number())
        .and_then(move |user: User, order_number: String| {
            let orders = orders.clone();
            async move { Ok::<_, Infallible>(super::with_vary(handle(&orders, user, order_number).await)) }
        })
}

async fn handle(orders: &OrderService, user: User, order_number: String) -> Response {
    match orders.register_order(user.id, &order_number).await {
        Ok(RegistrationOutcome::Accepted) => {
            super::json_error(StatusCode::ACCEPTED, "Accepted", "order accepted for processing")
        }
        Ok(RegistrationOutcome::AlreadyAccepted) => {
            super::json_error(StatusCode::ACCEPTED, "Accepted", "order accepted for processing")
        }
        Ok(RegistrationOutcome::AlreadyOwnedPending) => {
            super::json_error(StatusCode::OK, "AlreadyUploaded", "order was already uploaded by this user")
        }
        Ok(RegistrationOutcome::OwnedByOtherUser) => super::json_error(
            StatusCode::CONFLICT,
            "OwnedByOtherUser",
            "order was already uploaded by a different user",
        ),
        Err(OrderError::InvalidFormat) => super::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "InvalidOrderFormat",
            "order number is not a valid Luhn identifier",
        ),
        Err(OrderError::Internal(err)) => {
            tracing::error!(?err, "register_order error");
            super::internal_error()
        }
    }
}
