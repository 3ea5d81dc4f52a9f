use std::path::Path;

use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};

use crate::{db_types::Member, sqlite::db::members::MEMBER_COLUMNS, SqliteDatabase};

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/bce_test_{}.db", dir.display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    migrate!("./migrations").run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database<P: AsRef<Path>>(path: P) {
    let p = path.as_ref().as_os_str().to_str().unwrap();
    if let Err(e) = Sqlite::drop_database(p).await {
        warn!("Error dropping database {p}: {e:?}");
    }
    Sqlite::create_database(p).await.expect("Error creating database");
    info!("Created Sqlite database {p}");
}

/// Inserts the company root member directly. The root has no sponsor and no parent, which the
/// registration workflow deliberately cannot produce.
pub async fn seed_root_member(db: &SqliteDatabase) -> Member {
    let sql = format!(
        "INSERT INTO members (member_number, full_name, email) VALUES ('900000000', 'Company Root', \
         'root@example.com') RETURNING {MEMBER_COLUMNS}"
    );
    sqlx::query_as::<_, Member>(&sql).fetch_one(db.pool()).await.expect("Error seeding root member")
}
