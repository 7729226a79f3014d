use crate::models::CounterRecord;
use crate::storage::{Lookup, StoreResult, TableStore};
use async_trait::async_trait;
use dashmap::DashMap;

/// In-process table, selected with a `memory://` connection string.
///
/// Contents live as long as the process; useful for local runs and tests.
#[derive(Default)]
pub struct MemoryTable {
    entities: DashMap<(String, String), CounterRecord>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TableStore for MemoryTable {
    async fn init(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn get_entity(&self, partition_key: &str, row_key: &str) -> StoreResult<Lookup> {
        let key = (partition_key.to_string(), row_key.to_string());
        Ok(match self.entities.get(&key) {
            Some(entry) => Lookup::Found(entry.value().clone()),
            None => Lookup::NotFound,
        })
    }

    async fn upsert_entity(&self, record: &CounterRecord) -> StoreResult<()> {
        let key = (record.partition_key.clone(), record.row_key.clone());
        self.entities.insert(key, record.clone());
        Ok(())
    }
}
