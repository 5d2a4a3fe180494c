//! SQLite storage for camera sources and their reading history

pub mod sources;

pub use sources::SqliteSourceRepository;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tja_common::Result;
use tracing::info;

/// Open (creating if needed) the database and ensure the schema exists
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create tables and indexes (idempotent)
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS traffic_sources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            enabled INTEGER NOT NULL DEFAULT 1,
            cctv_date TEXT,
            current_traffic_amount INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS traffic_results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_id INTEGER NOT NULL REFERENCES traffic_sources(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            cctv_date TEXT,
            traffic_amount INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_traffic_results_source ON traffic_results(source_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_traffic_sources_enabled ON traffic_sources(enabled)")
        .execute(pool)
        .await?;

    Ok(())
}
