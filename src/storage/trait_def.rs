use crate::models::CounterRecord;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stored counter record is invalid: {0}")]
    InvalidRecord(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a point read. Absence is a normal result, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(CounterRecord),
    NotFound,
}

impl Lookup {
    pub fn into_record(self) -> Option<CounterRecord> {
        match self {
            Lookup::Found(record) => Some(record),
            Lookup::NotFound => None,
        }
    }
}

/// A key-value table addressed by (partition key, row key).
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Create the table if it does not exist yet
    async fn init(&self) -> StoreResult<()>;

    /// Point read by key
    async fn get_entity(&self, partition_key: &str, row_key: &str) -> StoreResult<Lookup>;

    /// Insert the record, or replace every field of the existing one
    async fn upsert_entity(&self, record: &CounterRecord) -> StoreResult<()>;
}
