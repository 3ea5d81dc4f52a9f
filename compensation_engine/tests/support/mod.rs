#![allow(dead_code)]
//! Shared scaffolding for the integration tests: a fresh migrated database per test, plus
//! shortcuts for building small genealogies.

use compensation_engine::{
    db_types::{Leg, Member, NewMember},
    test_utils::{prepare_test_env, random_db_path, seed_root_member},
    CompensationDatabase,
    SqliteDatabase,
};

/// A fresh, migrated database with the company root already seeded.
pub async fn new_test_db() -> (SqliteDatabase, Member) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error connecting to test database");
    let root = seed_root_member(&db).await;
    (db, root)
}

pub async fn register(db: &SqliteDatabase, name: &str, email: &str, sponsor_id: i64) -> Member {
    db.register_member(NewMember::new(name, email, sponsor_id)).await.expect("Error registering member")
}

pub async fn register_and_place(
    db: &SqliteDatabase,
    name: &str,
    email: &str,
    sponsor_id: i64,
    parent_id: i64,
    leg: Leg,
) -> Member {
    let member = register(db, name, email, sponsor_id).await;
    db.place_member(member.id, parent_id, leg).await.expect("Error placing member")
}
