use chrono::{DateTime, Utc};

/// A server-side record binding an opaque refresh token to a user.
/// `UpsertSession` (delete-then-insert, see `database::users`) guarantees at
/// most one row per `user_id` even though there is no `UNIQUE(user_id)`
/// constraint backing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}
