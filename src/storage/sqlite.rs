use crate::models::{format_timestamp, CounterRecord};
use crate::storage::row::CounterRow;
use crate::storage::{Lookup, StoreError, StoreResult, TableStore};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

pub struct SqliteTable {
    pool: Arc<SqlitePool>,
    table: String,
}

impl SqliteTable {
    /// Open a pool against `database_url`. The database file is created if
    /// missing. `table` must already be a validated SQL identifier.
    pub async fn new(database_url: &str, table: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
            table: table.to_string(),
        })
    }
}

#[async_trait]
impl TableStore for SqliteTable {
    async fn init(&self) -> StoreResult<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                partition_key TEXT NOT NULL,
                row_key TEXT NOT NULL,
                total_visitors INTEGER NOT NULL DEFAULT 0,
                visitors_today INTEGER NOT NULL DEFAULT 0,
                last_visited TEXT NOT NULL,
                PRIMARY KEY (partition_key, row_key)
            )
            "#,
            self.table
        ))
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::Other(e.into()))?;

        Ok(())
    }

    async fn get_entity(&self, partition_key: &str, row_key: &str) -> StoreResult<Lookup> {
        let row = sqlx::query_as::<_, CounterRow>(&format!(
            r#"
            SELECT partition_key, row_key, total_visitors, visitors_today, last_visited
            FROM {}
            WHERE partition_key = ? AND row_key = ?
            "#,
            self.table
        ))
        .bind(partition_key)
        .bind(row_key)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::Other(e.into()))?;

        match row {
            Some(row) => Ok(Lookup::Found(CounterRecord::try_from(row)?)),
            None => Ok(Lookup::NotFound),
        }
    }

    async fn upsert_entity(&self, record: &CounterRecord) -> StoreResult<()> {
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (partition_key, row_key, total_visitors, visitors_today, last_visited)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (partition_key, row_key) DO UPDATE SET
                total_visitors = excluded.total_visitors,
                visitors_today = excluded.visitors_today,
                last_visited = excluded.last_visited
            "#,
            self.table
        ))
        .bind(&record.partition_key)
        .bind(&record.row_key)
        .bind(record.total_visitors)
        .bind(record.visitors_today)
        .bind(format_timestamp(record.last_visited))
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::Other(e.into()))?;

        Ok(())
    }
}
