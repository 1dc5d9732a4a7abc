//! Database module: account models, schema, and the Postgres gateway.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database
//! - `store.rs`: the `AccountStore` trait the handlers depend on
//! - `postgres.rs`: `AccountStore` over a sqlx Postgres pool

pub mod models;
pub mod postgres;
pub mod schema;
pub mod store;

pub use models::{Account, NewAccount};
pub use postgres::{PgAccountStore, PgPool, connect};
pub use schema::POSTGRES_INIT;
pub use store::AccountStore;
