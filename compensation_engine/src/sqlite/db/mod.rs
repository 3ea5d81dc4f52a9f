//! # SQLite database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interactions are maintained by simple functions (rather than stateful structs) that
//! accept a `&mut SqliteConnection` argument. Callers can obtain a connection from a pool, or
//! create an atomic transaction as the need arises and call through to the functions without any
//! other changes. The transactional workflows in
//! [`SqliteDatabase`](crate::sqlite::SqliteDatabase) are composed entirely out of these
//! functions.
use std::env;

use log::{debug, info};
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod commissions;
pub mod members;
pub mod settings;
pub mod tree;
pub mod wallet;

const SQLITE_DB_URL: &str = "sqlite://data/compensation.db";

pub fn db_url() -> String {
    let result = env::var("BCE_DATABASE_URL").unwrap_or_else(|_| {
        info!("BCE_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    // Pooled SQLite readers can miss rows committed on a sibling connection moments earlier,
    // and a workflow must see what the previous call committed (a freshly registered sponsor,
    // a just-placed member). One shared connection gives read-your-writes; SQLite is
    // single-writer, so extra connections would not add write parallelism anyway.
    if max_connections > 1 {
        debug!("🗃️ Capping the SQLite pool at one connection ({max_connections} requested)");
    }
    let pool = SqlitePoolOptions::new().max_connections(1).connect(url).await?;
    Ok(pool)
}
