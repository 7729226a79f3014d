use sqlx::FromRow;

use crate::models::{parse_timestamp, CounterRecord};
use crate::storage::StoreError;

/// Raw row as stored by the SQL backends; `last_visited` is ISO-8601 text.
#[derive(Debug, FromRow)]
pub(crate) struct CounterRow {
    pub partition_key: String,
    pub row_key: String,
    pub total_visitors: i64,
    pub visitors_today: i64,
    pub last_visited: String,
}

impl TryFrom<CounterRow> for CounterRecord {
    type Error = StoreError;

    fn try_from(row: CounterRow) -> Result<Self, Self::Error> {
        if row.total_visitors < 0 || row.visitors_today < 0 {
            return Err(StoreError::InvalidRecord(format!(
                "negative counters (total_visitors={}, visitors_today={})",
                row.total_visitors, row.visitors_today
            )));
        }

        let last_visited = parse_timestamp(&row.last_visited).map_err(|e| {
            StoreError::InvalidRecord(format!(
                "last_visited '{}' is not an ISO-8601 timestamp: {e}",
                row.last_visited
            ))
        })?;

        Ok(CounterRecord {
            partition_key: row.partition_key,
            row_key: row.row_key,
            total_visitors: row.total_visitors,
            visitors_today: row.visitors_today,
            last_visited,
        })
    }
}
