//! SQL DDL for the two account tables.

/// PostgreSQL schema:
/// - `login` holds one credential per email (`email` UNIQUE)
/// - `users` holds the profile; `email` UNIQUE, paired 1:1 with `login`
/// - `entries` BIGINT counter starting at 0
///
/// Idempotent; safe to run on every start.
pub const POSTGRES_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS login (
    id SERIAL PRIMARY KEY,
    hash TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    entries BIGINT NOT NULL DEFAULT 0,
    joined TIMESTAMPTZ NOT NULL
);
"#;
