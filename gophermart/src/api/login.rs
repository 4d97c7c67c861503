use crate::IdentityService;
use model::user::Credentials;
use std::{convert::Infallible, sync::Arc};
use warp::{reply::Response, Filter, Rejection, Reply};

pub fn login(identity: Arc<IdentityService>) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "user" / "login")
        .and(warp::post())
        .and(super::extract_json::<Credentials>())
        .and_then(move |credentials: Credentials| {
            let identity = identity.clone();
            async move { Ok::<_, Infallible>(handle(&identity, credentials).await) }
        })
}

async fn handle(identity: &IdentityService, credentials: Credentials) -> Response {
    match identity.login(&credentials).await {
        Ok((_user, tokens)) => super::register::success_reply(tokens),
        Err(err) => super::register::error_reply(err),
    }
}
