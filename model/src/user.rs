use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user. `password_hash` is the bcrypt digest of the
/// submitted password mixed with the process-wide password salt; the
/// plaintext password is never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Credentials carried in `/api/user/register` and `/api/user/login` bodies.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// Access/refresh token pair returned by register and login.
#[derive(Clone, Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
