//! SQLite backend for the compensation engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
