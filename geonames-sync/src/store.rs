use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::counter;
use sqlx::PgPool;
use tracing::warn;

use crate::{
    metrics_consts::{BATCH_WRITE_ATTEMPT, ROWS_WRITTEN},
    target::TranslationTarget,
    types::TranslationRow,
};

const BATCH_MAX_RETRY_ATTEMPTS: u64 = 3;
const BATCH_RETRY_DELAY_MS: u64 = 50;

/// Column-major buffers for one vectorized write: one bind per column, one
/// statement per chunk.
struct RowBatch {
    parent_ids: Vec<i64>,
    names: Vec<String>,
    locales: Vec<Option<String>>,
    is_preferred: Vec<bool>,
    is_short: Vec<bool>,
    is_colloquial: Vec<bool>,
    is_historic: Vec<bool>,
    alternate_name_ids: Vec<i64>,
    is_synced: Vec<bool>,
    created_at: Vec<DateTime<Utc>>,
    updated_at: Vec<DateTime<Utc>>,
}

impl RowBatch {
    fn from_rows(rows: &[TranslationRow]) -> Self {
        let mut batch = Self {
            parent_ids: Vec::with_capacity(rows.len()),
            names: Vec::with_capacity(rows.len()),
            locales: Vec::with_capacity(rows.len()),
            is_preferred: Vec::with_capacity(rows.len()),
            is_short: Vec::with_capacity(rows.len()),
            is_colloquial: Vec::with_capacity(rows.len()),
            is_historic: Vec::with_capacity(rows.len()),
            alternate_name_ids: Vec::with_capacity(rows.len()),
            is_synced: Vec::with_capacity(rows.len()),
            created_at: Vec::with_capacity(rows.len()),
            updated_at: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            batch.parent_ids.push(row.parent_id);
            batch.names.push(row.name.clone());
            batch.locales.push(row.locale.clone());
            batch.is_preferred.push(row.is_preferred);
            batch.is_short.push(row.is_short);
            batch.is_colloquial.push(row.is_colloquial);
            batch.is_historic.push(row.is_historic);
            batch.alternate_name_ids.push(row.alternate_name_id);
            batch.is_synced.push(row.is_synced);
            batch.created_at.push(row.created_at);
            batch.updated_at.push(row.updated_at);
        }
        batch
    }

    fn bind_to<'q>(
        &'q self,
        query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        query
            .bind(&self.parent_ids)
            .bind(&self.names)
            .bind(&self.locales)
            .bind(&self.is_preferred)
            .bind(&self.is_short)
            .bind(&self.is_colloquial)
            .bind(&self.is_historic)
            .bind(&self.alternate_name_ids)
            .bind(&self.is_synced)
            .bind(&self.created_at)
            .bind(&self.updated_at)
    }
}

/// Storage collaborator for one translation table: bulk insert, allow-listed
/// upsert, keyed delete, truncate. One statement per chunk; no transaction
/// is held across chunks.
pub struct TranslationStore {
    pool: PgPool,
    target: TranslationTarget,
}

impl TranslationStore {
    pub fn new(pool: PgPool, target: TranslationTarget) -> Self {
        Self { pool, target }
    }

    pub fn target(&self) -> &TranslationTarget {
        &self.target
    }

    fn insert_sql(&self) -> String {
        format!(
            r#"
            INSERT INTO {table} ({fk}, name, locale, is_preferred, is_short, is_colloquial, is_historic, alternate_name_id, is_synced, created_at, updated_at)
                (SELECT * FROM UNNEST(
                    $1::bigint[],
                    $2::text[],
                    $3::text[],
                    $4::boolean[],
                    $5::boolean[],
                    $6::boolean[],
                    $7::boolean[],
                    $8::bigint[],
                    $9::boolean[],
                    $10::timestamptz[],
                    $11::timestamptz[]))"#,
            table = self.target.translation_table,
            fk = self.target.foreign_key,
        )
    }

    /// One bulk insert per chunk. Not idempotent; the seeding path truncates
    /// and restarts after a partial failure.
    pub async fn insert_batch(&self, rows: &[TranslationRow]) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }
        let sql = self.insert_sql();
        let written = self.execute_batch(&sql, &RowBatch::from_rows(rows)).await?;
        counter!(ROWS_WRITTEN, "op" => "insert").increment(written);
        Ok(written)
    }

    /// Keyed upsert for the daily modifications feed. A matched sync key
    /// rewrites only the updatable attribute set; the foreign key, sync key,
    /// creation timestamp and sync flag survive as created. An unmatched key
    /// inserts the whole row.
    pub async fn upsert_batch(&self, rows: &[TranslationRow]) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            r#"{insert}
                ON CONFLICT (alternate_name_id) DO UPDATE SET
                    name = EXCLUDED.name,
                    is_preferred = EXCLUDED.is_preferred,
                    is_short = EXCLUDED.is_short,
                    is_colloquial = EXCLUDED.is_colloquial,
                    is_historic = EXCLUDED.is_historic,
                    locale = EXCLUDED.locale,
                    updated_at = EXCLUDED.updated_at"#,
            insert = self.insert_sql(),
        );
        let written = self.execute_batch(&sql, &RowBatch::from_rows(rows)).await?;
        counter!(ROWS_WRITTEN, "op" => "upsert").increment(written);
        Ok(written)
    }

    /// Delete by sync key. Keys with no matching row are fine; replaying a
    /// delete feed is a no-op.
    pub async fn delete_batch(&self, sync_keys: &[i64]) -> Result<u64, sqlx::Error> {
        if sync_keys.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "DELETE FROM {} WHERE alternate_name_id = ANY($1)",
            self.target.translation_table
        );
        let done = sqlx::query(&sql)
            .bind(sync_keys)
            .execute(&self.pool)
            .await?;
        counter!(ROWS_WRITTEN, "op" => "delete").increment(done.rows_affected());
        Ok(done.rows_affected())
    }

    /// Empty the translation table ahead of a re-seed.
    pub async fn truncate(&self) -> Result<(), sqlx::Error> {
        let sql = format!("TRUNCATE {}", self.target.translation_table);
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn execute_batch(&self, sql: &str, batch: &RowBatch) -> Result<u64, sqlx::Error> {
        let mut tries: u64 = 1;
        loop {
            let result = batch.bind_to(sqlx::query(sql)).execute(&self.pool).await;
            match result {
                Ok(done) => {
                    counter!(BATCH_WRITE_ATTEMPT, "result" => "success").increment(1);
                    return Ok(done.rows_affected());
                }
                Err(e) => {
                    if tries == BATCH_MAX_RETRY_ATTEMPTS {
                        counter!(BATCH_WRITE_ATTEMPT, "result" => "failed").increment(1);
                        return Err(e);
                    }
                    counter!(BATCH_WRITE_ATTEMPT, "result" => "retry").increment(1);
                    warn!("batch write failed (attempt {tries}): {e}");
                    let jitter = rand::random::<u64>() % 50;
                    let delay = tries * BATCH_RETRY_DELAY_MS + jitter;
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    tries += 1;
                }
            }
        }
    }
}
