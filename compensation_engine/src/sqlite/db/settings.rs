//! Tunable rates and the generation-rate schedule.
//!
//! Settings are read through `get_or_default` everywhere in the engine, so a fresh database
//! becomes self-seeding: the first read of a key stores the configured default.

use log::debug;
use sqlx::SqliteConnection;

use crate::{db_types::GenerationRate, traits::SettingsError};

/// Reads a setting, creating it with the given default first if it does not exist yet.
pub async fn get_or_default(key: &str, default: f64, conn: &mut SqliteConnection) -> Result<f64, SettingsError> {
    let inserted = sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES ($1, $2)")
        .bind(key)
        .bind(default)
        .execute(&mut *conn)
        .await?;
    if inserted.rows_affected() > 0 {
        debug!("🗃️ Setting '{key}' was absent. Seeded with default {default}");
    }
    let value: f64 = sqlx::query_scalar("SELECT value FROM settings WHERE key = $1").bind(key).fetch_one(&mut *conn).await?;
    Ok(value)
}

pub async fn set(key: &str, value: f64, conn: &mut SqliteConnection) -> Result<(), SettingsError> {
    sqlx::query("INSERT INTO settings (key, value) VALUES ($1, $2) ON CONFLICT (key) DO UPDATE SET value = excluded.value")
        .bind(key)
        .bind(value)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// The override rate for one generation, or `None` if no row is configured. A missing row is
/// the normal terminator for generation distribution.
pub async fn generation_rate(generation: i64, conn: &mut SqliteConnection) -> Result<Option<f64>, SettingsError> {
    let rate: Option<f64> = sqlx::query_scalar("SELECT rate FROM generation_rates WHERE generation = $1")
        .bind(generation)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(rate)
}

pub async fn set_generation_rate(generation: i64, rate: f64, conn: &mut SqliteConnection) -> Result<(), SettingsError> {
    sqlx::query(
        "INSERT INTO generation_rates (generation, rate) VALUES ($1, $2) ON CONFLICT (generation) DO UPDATE SET rate \
         = excluded.rate",
    )
    .bind(generation)
    .bind(rate)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn generation_rates(conn: &mut SqliteConnection) -> Result<Vec<GenerationRate>, SettingsError> {
    let rates =
        sqlx::query_as::<_, GenerationRate>("SELECT generation, rate FROM generation_rates ORDER BY generation")
            .fetch_all(&mut *conn)
            .await?;
    Ok(rates)
}
