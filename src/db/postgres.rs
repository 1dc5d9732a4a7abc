use crate::config::Config;
use crate::db::models::{Account, CredentialRecord, NewAccount};
use crate::db::schema::POSTGRES_INIT;
use crate::db::store::AccountStore;
use crate::error::BrainError;
use crate::service::hasher::CredentialHasher;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{Pool, Postgres};
use std::str::FromStr;
use tracing::debug;

pub type PgPool = Pool<Postgres>;

/// Open a connection pool using the store settings from `cfg`.
pub async fn connect(cfg: &Config) -> Result<PgPool, BrainError> {
    let ssl_mode = if cfg.database_ssl {
        PgSslMode::Require
    } else {
        PgSslMode::Prefer
    };
    let connect_opts = PgConnectOptions::from_str(cfg.database_url.as_str())?.ssl_mode(ssl_mode);
    let pool = PgPoolOptions::new()
        .max_connections(cfg.database_max_connections.max(1))
        .acquire_timeout(cfg.backend_timeout())
        .connect_with(connect_opts)
        .await?;
    Ok(pool)
}

#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
    hasher: CredentialHasher,
}

impl PgAccountStore {
    pub fn new(pool: PgPool, hasher: CredentialHasher) -> Self {
        Self { pool, hasher }
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), BrainError> {
        // one statement per query; prepared statements take a single command
        for stmt in POSTGRES_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn count_accounts(&self) -> Result<i64, BrainError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    /// Both inserts share one transaction; dropping `tx` on any error rolls
    /// back the credential as well.
    async fn register_account(&self, new: NewAccount) -> Result<Account, BrainError> {
        let mut tx = self.pool.begin().await?;

        let (email,): (String,) =
            sqlx::query_as("INSERT INTO login (hash, email) VALUES ($1, $2) RETURNING email")
                .bind(&new.hash)
                .bind(&new.email)
                .fetch_one(&mut *tx)
                .await?;

        let account: Account = sqlx::query_as(
            r#"INSERT INTO users (email, name, joined) VALUES ($1, $2, $3)
               RETURNING id, email, name, joined, entries"#,
        )
        .bind(&email)
        .bind(&new.name)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(id = account.id, "account registered");
        Ok(account)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, BrainError> {
        // Both lookups read from one snapshot; the connection goes back to the
        // pool before the slow hash check.
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let cred: Option<CredentialRecord> =
            sqlx::query_as("SELECT email, hash FROM login WHERE email = $1")
                .bind(email)
                .fetch_optional(&mut *tx)
                .await?;
        let account: Option<Account> = match &cred {
            Some(cred) => {
                sqlx::query_as(
                    "SELECT id, email, name, joined, entries FROM users WHERE email = $1",
                )
                .bind(&cred.email)
                .fetch_optional(&mut *tx)
                .await?
            }
            None => None,
        };
        tx.commit().await?;

        let cred = cred.ok_or(BrainError::NotFound)?;
        if !self.hasher.verify(password, &cred.hash).await {
            return Err(BrainError::InvalidCredentials);
        }
        account.ok_or(BrainError::NotFound)
    }

    async fn increment_entries(&self, id: i32, delta: i64) -> Result<Account, BrainError> {
        let account: Option<Account> = sqlx::query_as(
            r#"UPDATE users SET entries = entries + $1 WHERE id = $2
               RETURNING id, email, name, joined, entries"#,
        )
        .bind(delta)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        account.ok_or(BrainError::NotFound)
    }
}
