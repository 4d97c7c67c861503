use crate::{IdentityError, IdentityService};
use model::user::{Credentials, TokenPair};
use std::{convert::Infallible, sync::Arc};
use warp::{
    http::StatusCode,
    reply::{Reply, Response},
    Filter, Rejection,
};

pub fn register(identity: Arc<IdentityService>) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "user" / "register")
        .and(warp::post())
        .and(super::extract_json::<Credentials>())
        .and_then(move |credentials: Credentials| {
            let identity = identity.clone();
            async move { Ok::<_, Infallible>(handle(&identity, credentials).await) }
        })
}

async fn handle(identity: &IdentityService, credentials: Credentials) -> Response {
    match identity.register(&credentials).await {
        Ok((_user, tokens)) => success_reply(tokens),
        Err(err) => error_reply(err),
    }
}

pub(super) fn success_reply(tokens: TokenPair) -> Response {
    let authorization = format!("Bearer {}", tokens.access_token);
    warp::reply::with_header(
        warp::reply::with_status(warp::reply::json(&tokens), StatusCode::OK),
        "Authorization",
        authorization,
    )
    .into_response()
}

pub(super) fn error_reply(err: IdentityError) -> Response {
    match err {
        IdentityError::InvalidLogin => {
            super::json_error(StatusCode::UNPROCESSABLE_ENTITY, "InvalidLogin", "login must not be empty")
        }
        IdentityError::InvalidPassword => super::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "InvalidPassword",
            "password must be between 8 and 72 characters",
        ),
        IdentityError::DuplicateLogin => {
            super::json_error(StatusCode::CONFLICT, "DuplicateLogin", "login is already taken")
        }
        IdentityError::InvalidCredentials => {
            super::json_error(StatusCode::BAD_REQUEST, "InvalidCredentials", "invalid login or password")
        }
        IdentityError::TokenExpired | IdentityError::InvalidToken | IdentityError::NotFound => {
            tracing::error!(?err, "unexpected identity error during registration");
            super::internal_error()
        }
        IdentityError::Internal(err) => {
            tracing::error!(?err, "register error");
            super::internal_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::test::request;

    #[tokio::test]
    async fn accepts_json_body() {
        let filter = warp::path!("api" / "user" / "register")
            .and(warp::post())
            .and(super::super::extract_json::<Credentials>());
        let result = request()
            .path("/api/user/register")
            .method("POST")
            .json(&Credentials {
                login: "alice".into(),
                password: "password1".into(),
            })
            .filter(&filter)
            .await
            .unwrap();
        assert_eq!(result.login, "alice");
    }
}
