//! Camera source repository
//!
//! History rows are append-only and always returned in insertion order.

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tja_common::models::PLACEHOLDER_TITLE;
use tja_common::{time, CameraSource, Error, Reading, Result, SourceUpdate, TrafficResult};

use crate::types::SourceRepository;

const SOURCE_COLUMNS: &str =
    "id, url, title, enabled, cctv_date, current_traffic_amount, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteSourceRepository {
    pool: SqlitePool,
}

impl SqliteSourceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a discovered camera URL under the placeholder title
    ///
    /// Existing URLs are left untouched. Returns the source id either way.
    pub async fn register_source(&self, url: &str) -> Result<i64> {
        let now = time::to_storage(&time::now());

        sqlx::query(
            r#"
            INSERT INTO traffic_sources (url, title, enabled, current_traffic_amount, created_at, updated_at)
            VALUES (?, ?, 1, 0, ?, ?)
            ON CONFLICT(url) DO NOTHING
            "#,
        )
        .bind(url)
        .bind(PLACEHOLDER_TITLE)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let id: i64 = sqlx::query_scalar("SELECT id FROM traffic_sources WHERE url = ?")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }

    /// Enable or disable polling for a source
    pub async fn set_enabled(&self, id: i64, enabled: bool) -> Result<()> {
        let result = sqlx::query("UPDATE traffic_sources SET enabled = ?, updated_at = ? WHERE id = ?")
            .bind(enabled)
            .bind(time::to_storage(&time::now()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("traffic source {}", id)));
        }
        Ok(())
    }

    /// Load one source with its history
    pub async fn get(&self, id: i64) -> Result<Option<CameraSource>> {
        let row = sqlx::query(&format!("SELECT {} FROM traffic_sources WHERE id = ?", SOURCE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut source = source_from_row(&row)?;
                source.results = self.load_history(source.id).await?;
                Ok(Some(source))
            }
            None => Ok(None),
        }
    }

    async fn load_history(&self, source_id: i64) -> Result<Vec<TrafficResult>> {
        let rows = sqlx::query(
            r#"
            SELECT id, source_id, title, cctv_date, traffic_amount, created_at
            FROM traffic_results
            WHERE source_id = ?
            ORDER BY id
            "#,
        )
        .bind(source_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(result_from_row).collect()
    }

    async fn with_history(&self, rows: Vec<SqliteRow>) -> Result<Vec<CameraSource>> {
        let mut sources = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut source = source_from_row(row)?;
            source.results = self.load_history(source.id).await?;
            sources.push(source);
        }
        Ok(sources)
    }
}

#[async_trait]
impl SourceRepository for SqliteSourceRepository {
    async fn list_enabled(&self) -> Result<Vec<CameraSource>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM traffic_sources WHERE enabled = 1 ORDER BY id",
            SOURCE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        self.with_history(rows).await
    }

    async fn list_by_title(&self, title: &str) -> Result<Vec<CameraSource>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM traffic_sources WHERE lower(title) = lower(?) ORDER BY id",
            SOURCE_COLUMNS
        ))
        .bind(title)
        .fetch_all(&self.pool)
        .await?;

        self.with_history(rows).await
    }

    async fn update(&self, id: i64, fields: &SourceUpdate) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }

        let result = sqlx::query(
            r#"
            UPDATE traffic_sources
            SET title = COALESCE(?, title),
                cctv_date = COALESCE(?, cctv_date),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.cctv_date)
        .bind(time::to_storage(&time::now()))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("traffic source {}", id)));
        }
        Ok(())
    }

    async fn append_result(&self, id: i64, reading: &Reading) -> Result<TrafficResult> {
        let created_at = time::now();
        let stamp = time::to_storage(&created_at);

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE traffic_sources
            SET current_traffic_amount = ?, cctv_date = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(reading.traffic)
        .bind(&reading.date)
        .bind(&stamp)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(Error::NotFound(format!("traffic source {}", id)));
        }

        let result_id = sqlx::query(
            r#"
            INSERT INTO traffic_results (source_id, title, cctv_date, traffic_amount, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(&reading.title)
        .bind(&reading.date)
        .bind(reading.traffic)
        .bind(&stamp)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;

        Ok(TrafficResult {
            id: result_id,
            source_id: id,
            traffic_title: reading.title.clone(),
            cctv_date: Some(reading.date.clone()),
            traffic_amount: reading.traffic,
            created_at,
        })
    }
}

fn source_from_row(row: &SqliteRow) -> Result<CameraSource> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(CameraSource {
        id: row.try_get("id")?,
        url: row.try_get("url")?,
        title: row.try_get("title")?,
        enabled: row.try_get("enabled")?,
        cctv_date: row.try_get("cctv_date")?,
        current_traffic_amount: row.try_get("current_traffic_amount")?,
        created_at: time::from_storage(&created_at)?,
        updated_at: time::from_storage(&updated_at)?,
        results: Vec::new(),
    })
}

fn result_from_row(row: &SqliteRow) -> Result<TrafficResult> {
    let created_at: String = row.try_get("created_at")?;

    Ok(TrafficResult {
        id: row.try_get("id")?,
        source_id: row.try_get("source_id")?,
        traffic_title: row.try_get("title")?,
        cctv_date: row.try_get("cctv_date")?,
        traffic_amount: row.try_get("traffic_amount")?,
        created_at: time::from_storage(&created_at)?,
    })
}
