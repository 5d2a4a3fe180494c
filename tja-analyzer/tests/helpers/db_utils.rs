//! Database Test Utilities

use tempfile::TempDir;
use tja_analyzer::db::{init_database_pool, SqliteSourceRepository};

/// Create a repository over a fresh on-disk database
///
/// Returns (TempDir, repository) - TempDir must be kept alive for duration of test
pub async fn create_test_repository() -> (TempDir, SqliteSourceRepository) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("test_trafficjam.db");

    let pool = init_database_pool(&db_path)
        .await
        .expect("Failed to initialize test database");

    (temp_dir, SqliteSourceRepository::new(pool))
}
