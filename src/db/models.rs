use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of `users`: the public profile and usage counter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Account {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub joined: DateTime<Utc>,
    pub entries: i64,
}

/// A row of `login`. Never serialized; the hash stays inside the gateway.
#[derive(Debug, Clone, FromRow)]
pub struct CredentialRecord {
    pub email: String,
    pub hash: String,
}

/// Input to registration, with the password already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub hash: String,
}
