use crate::models::{format_timestamp, CounterRecord};
use crate::storage::row::CounterRow;
use crate::storage::{Lookup, StoreError, StoreResult, TableStore};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub struct PostgresTable {
    pool: Arc<PgPool>,
    table: String,
}

impl PostgresTable {
    pub async fn new(database_url: &str, table: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
            table: table.to_string(),
        })
    }
}

#[async_trait]
impl TableStore for PostgresTable {
    async fn init(&self) -> StoreResult<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                partition_key TEXT NOT NULL,
                row_key TEXT NOT NULL,
                total_visitors BIGINT NOT NULL DEFAULT 0,
                visitors_today BIGINT NOT NULL DEFAULT 0,
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
            WHERE partition_key = $1 AND row_key = $2
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
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (partition_key, row_key) DO UPDATE SET
                total_visitors = EXCLUDED.total_visitors,
                visitors_today = EXCLUDED.visitors_today,
                last_visited = EXCLUDED.last_visited
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
