//! The HTTP surface: one `warp::Filter` per endpoint, composed here into
//! the full router. Each route's filter lives in its own module, `.or()`'d
//! together, with rejections recovered into a single JSON error shape.
mod auth;
mod balance;
mod create_order;
mod list_orders;
mod login;
mod register;
mod withdraw;
mod withdrawals;

use crate::{IdentityService, LedgerService, OrderService};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{
    http::StatusCode,
    reply::{Reply, Response},
    Filter, Rejection,
};

/// Builds the full `/api/user/...` router over the three core services.
pub fn routes(
    identity: Arc<IdentityService>,
    orders: Arc<OrderService>,
    ledger: Arc<LedgerService>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    register::register(identity.clone())
        .or(login::login(identity.clone()))
        .or(create_order::create_order(identity.clone(), orders.clone()))
        .or(list_orders::list_orders(identity.clone(), orders))
        .or(balance::get_balance(identity.clone(), ledger.clone()))
        .or(withdraw::withdraw(identity.clone(), ledger.clone()))
        .or(withdrawals::list_withdrawals(identity, ledger))
        .recover(handle_rejection)
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error_type: &'a str,
    description: &'a str,
}

/// Builds a JSON error reply: an `error_type` tag plus a free-text
/// `description`.
pub(crate) fn json_error(status: StatusCode, error_type: &str, description: &str) -> Response {
    warp::reply::with_status(
        warp::reply::json(&ErrorBody {
            error_type,
            description,
        }),
        status,
    )
    .into_response()
}

pub(crate) fn internal_error() -> Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError", "")
}

/// Tags a response with `Vary: Authorization` — the resource's
/// representation depends on who's asking.
pub(crate) fn with_vary(reply: impl Reply) -> Response {
    warp::reply::with_header(reply, "Vary", "Authorization").into_response()
}

const MAX_JSON_BODY_BYTES: u64 = 1024 * 16;

fn extract_json<T: serde::de::DeserializeOwned + Send>(
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_JSON_BODY_BYTES).and(warp::body::json())
}

#[derive(Debug)]
struct BadContentType;
impl warp::reject::Reject for BadContentType {}

/// Extracts the raw order-number body of `POST /api/user/orders`, rejecting
/// anything not declared `text/plain`.
fn extract_text_order_number() -> impl Filter<Extract = (String,), Error = Rejection> + Clone {
    warp::header::<String>("content-type")
        .and_then(|content_type: String| async move {
            if content_type.split(';').next().unwrap_or("").trim() == "text/plain" {
                Ok(())
            } else {
                Err(warp::reject::custom(BadContentType))
            }
        })
        .untuple_one()
        .and(warp::body::content_length_limit(MAX_JSON_BODY_BYTES))
        .and(warp::body::bytes())
        .and_then(|bytes: bytes::Bytes| async move {
            String::from_utf8(bytes.to_vec())
                .map(|body| body.trim().to_string())
                .map_err(|_| warp::reject::custom(BadContentType))
        })
}

async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    if let Some(auth::AuthRejection(failure)) = rejection.find() {
        let response = match failure {
            auth::AuthFailure::Missing | auth::AuthFailure::Malformed => {
                json_error(StatusCode::UNAUTHORIZED, "Unauthorized", "missing or malformed authorization header")
            }
            auth::AuthFailure::TokenExpired => {
                json_error(StatusCode::UNAUTHORIZED, "TokenExpired", "token expired")
            }
            auth::AuthFailure::InvalidToken => {
                json_error(StatusCode::UNAUTHORIZED, "InvalidToken", "invalid token")
            }
            auth::AuthFailure::Internal => internal_error(),
        };
        return Ok(with_vary(response));
    }
    if rejection.find::<BadContentType>().is_some()
        || rejection.find::<warp::reject::MissingHeader>().is_some()
        || rejection.find::<warp::reject::InvalidHeader>().is_some()
    {
        return Ok(json_error(StatusCode::BAD_REQUEST, "BadRequest", "expected a text/plain order number body"));
    }
    if rejection.find::<warp::filters::body::BodyDeserializeError>().is_some() {
        return Ok(json_error(StatusCode::BAD_REQUEST, "BadRequest", "malformed request body"));
    }
    if rejection.is_not_found() {
        return Ok(json_error(StatusCode::NOT_FOUND, "NotFound", "no such route"));
    }
    tracing::error!(?rejection, "unhandled rejection");
    Ok(internal_error())
}

#[cfg(test)]
async fn response_body(response: Response) -> Vec<u8> {
    let mut body = response.into_body();
    let mut result = Vec::new();
    while let Some(bytes) = futures::StreamExt::next(&mut body).await {
        result.extend_from_slice(bytes.unwrap().as_ref());
    }
    result
}
