//! Auth middleware: resolves the bearer token to a `User` and injects it
//! into the request scope as a `warp::Filter` extraction, the idiomatic
//! warp analogue of a middleware layer.
use crate::{IdentityError, IdentityService};
use model::User;
use std::sync::Arc;
use warp::{Filter, Rejection};

#[derive(Debug)]
pub struct AuthRejection(pub AuthFailure);
impl warp::reject::Reject for AuthRejection {}

#[derive(Debug, Clone, Copy)]
pub enum AuthFailure {
    Missing,
    Malformed,
    TokenExpired,
    InvalidToken,
    Internal,
}

fn reject(failure: AuthFailure) -> Rejection {
    warp::reject::custom(AuthRejection(failure))
}

/// Extracts the authenticated `User` from the `Authorization` header.
/// Attaching `Vary: Authorization` to the final reply is the caller's
/// job, once the response is known.
pub fn authenticated(identity: Arc<IdentityService>) -> impl Filter<Extract = (User,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let identity = identity.clone();
        async move {
            let header = header.ok_or_else(|| reject(AuthFailure::Missing))?;
            let token = parse_bearer(&header).ok_or_else(|| reject(AuthFailure::Malformed))?;

            let user_id = identity.verify_access_token(token).map_err(|err| match err {
                IdentityError::TokenExpired => reject(AuthFailure::TokenExpired),
                IdentityError::InvalidToken => reject(AuthFailure::InvalidToken),
                _ => reject(AuthFailure::Internal),
            })?;

            let user = identity.get_user_by_id(user_id).await.map_err(|err| match err {
                // A valid token for a user that no longer exists behaves like
                // an expired one: the bearer has lost whatever it proved.
                IdentityError::NotFound => reject(AuthFailure::TokenExpired),
                _ => reject(AuthFailure::Internal),
            })?;

            Ok::<User, Rejection>(user)
        }
    })
}

/// `Bearer <jwt>` where the JWT has three base64url segments joined by dots.
fn parse_bearer(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?;
    let mut segments = token.split('.');
    let all_valid = (0..3).all(|_| {
        segments
            .next()
            .map(|segment| !segment.is_empty() && segment.bytes().all(is_base64url_byte))
            .unwrap_or(false)
    });
    if all_valid && segments.next().is_none() {
        Some(token)
    } else {
        None
    }
}

fn is_base64url_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_three_well_formed_segments() {
        assert_eq!(parse_bearer("Bearer aaa.bbb.ccc"), Some("aaa.bbb.ccc"));
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert_eq!(parse_bearer("Bearer aaa.bbb"), None);
        assert_eq!(parse_bearer("Bearer aaa.bbb.ccc.ddd"), None);
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        assert_eq!(parse_bearer("Basic aaa.bbb.ccc"), None);
    }

    #[test]
    fn rejects_invalid_characters() {
        assert_eq!(parse_bearer("Bearer aa a.bbb.ccc"), None);
    }
}
