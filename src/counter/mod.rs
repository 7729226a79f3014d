//! Visitor counting.
//!
//! A visit reads the single counter record (or starts from zero when it is
//! absent), applies the rollover rule and writes the whole record back.
//! The read and the write are not guarded against concurrent visits, so two
//! overlapping requests can both read the same state and one increment is
//! lost.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::models::{CounterRecord, PARTITION_KEY, ROW_KEY};
use crate::storage::{ConnectError, Lookup, StoreError, TableConnector};

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("table store is not configured")]
    Configuration(#[source] ConnectError),
    #[error("table store operation failed")]
    Store(#[from] StoreError),
}

impl From<ConnectError> for CounterError {
    fn from(err: ConnectError) -> Self {
        match err {
            ConnectError::Open(e) => CounterError::Store(e),
            other => CounterError::Configuration(other),
        }
    }
}

/// Source of "now" for a visit
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Compute the record that results from one visit at `now`.
///
/// `previous` is the stored record, if any. A missing record counts as zero
/// visitors last seen at `now`, so the first visit yields 1/1.
pub fn apply_visit(previous: Option<&CounterRecord>, now: DateTime<Utc>) -> CounterRecord {
    let base = previous
        .cloned()
        .unwrap_or_else(|| CounterRecord::new(0, 0, now));

    let visitors_today = if base.last_visited.date_naive() == now.date_naive() {
        base.visitors_today.saturating_add(1)
    } else {
        1
    };

    CounterRecord {
        total_visitors: base.total_visitors.saturating_add(1),
        visitors_today,
        last_visited: now,
        ..base
    }
}

pub struct VisitorCounter {
    connector: Arc<TableConnector>,
    clock: Arc<dyn Clock>,
}

impl VisitorCounter {
    pub fn new(connector: Arc<TableConnector>) -> Self {
        Self::with_clock(connector, Arc::new(SystemClock))
    }

    pub fn with_clock(connector: Arc<TableConnector>, clock: Arc<dyn Clock>) -> Self {
        Self { connector, clock }
    }

    /// Record one visit and return the persisted record.
    ///
    /// Performs one read and, when every value is computed, one full
    /// replacing write. Nothing is written if the read fails.
    pub async fn handle_visit(&self) -> Result<CounterRecord, CounterError> {
        let table = self.connector.table().await?;
        let now = self.clock.now();

        let previous = match table.get_entity(PARTITION_KEY, ROW_KEY).await? {
            Lookup::Found(record) => Some(record),
            Lookup::NotFound => {
                debug!("No counter record yet, starting from zero");
                None
            }
        };

        let updated = apply_visit(previous.as_ref(), now);
        table.upsert_entity(&updated).await?;

        Ok(updated)
    }

    /// Read the counter without recording a visit.
    pub async fn current_counts(&self) -> Result<Option<CounterRecord>, CounterError> {
        let table = self.connector.table().await?;
        let lookup = table.get_entity(PARTITION_KEY, ROW_KEY).await?;
        Ok(lookup.into_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format_timestamp;
    use crate::storage::MemoryTable;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_first_visit_starts_both_counters_at_one() {
        let now = at(2025, 9, 3, 10, 0, 0);
        let record = apply_visit(None, now);

        assert_eq!(record.total_visitors, 1);
        assert_eq!(record.visitors_today, 1);
        assert_eq!(format_timestamp(record.last_visited), "2025-09-03T10:00:00");
        assert_eq!(record.partition_key, PARTITION_KEY);
        assert_eq!(record.row_key, ROW_KEY);
    }

    #[test]
    fn test_same_day_visit_increments_both() {
        let previous = CounterRecord::new(5, 3, at(2025, 9, 3, 9, 0, 0));
        let now = at(2025, 9, 3, 11, 0, 0);

        let record = apply_visit(Some(&previous), now);

        assert_eq!(record.total_visitors, 6);
        assert_eq!(record.visitors_today, 4);
        assert_eq!(format_timestamp(record.last_visited), "2025-09-03T11:00:00");
    }

    #[test]
    fn test_rollover_across_midnight_resets_today() {
        let previous = CounterRecord::new(10, 5, at(2025, 9, 2, 23, 59, 59));
        let now = at(2025, 9, 3, 0, 0, 1);

        let record = apply_visit(Some(&previous), now);

        assert_eq!(record.total_visitors, 11);
        assert_eq!(record.visitors_today, 1);
        assert_eq!(format_timestamp(record.last_visited), "2025-09-03T00:00:01");
    }

    #[test]
    fn test_rollover_after_a_long_gap() {
        let previous = CounterRecord::new(40, 12, at(2024, 1, 1, 12, 0, 0));
        let record = apply_visit(Some(&previous), at(2025, 1, 1, 12, 0, 0));

        assert_eq!(record.total_visitors, 41);
        assert_eq!(record.visitors_today, 1);
    }

    #[test]
    fn test_rollover_compares_dates_not_elapsed_time() {
        // One second apart but on different days
        let previous = CounterRecord::new(2, 2, at(2025, 9, 2, 23, 59, 59));
        assert_eq!(apply_visit(Some(&previous), at(2025, 9, 3, 0, 0, 0)).visitors_today, 1);

        // Almost a day apart but on the same day
        let previous = CounterRecord::new(2, 2, at(2025, 9, 3, 0, 0, 0));
        assert_eq!(apply_visit(Some(&previous), at(2025, 9, 3, 23, 59, 59)).visitors_today, 3);
    }

    #[test]
    fn test_repeated_visits_at_same_instant_keep_counting() {
        let now = at(2025, 9, 3, 10, 0, 0);
        let first = apply_visit(None, now);
        let second = apply_visit(Some(&first), now);

        assert_eq!(second.total_visitors, 2);
        assert_eq!(second.visitors_today, 2);
        assert_eq!(second.last_visited, now);
    }

    #[test]
    fn test_last_visited_always_advances_to_now() {
        let now = at(2025, 9, 3, 12, 30, 0);
        for previous in [
            None,
            Some(CounterRecord::new(3, 1, at(2025, 9, 3, 8, 0, 0))),
            Some(CounterRecord::new(3, 1, at(2025, 8, 30, 8, 0, 0))),
        ] {
            assert_eq!(apply_visit(previous.as_ref(), now).last_visited, now);
        }
    }

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[tokio::test]
    async fn test_current_counts_reads_without_recording() {
        let connector = Arc::new(TableConnector::with_table(Arc::new(MemoryTable::new())));
        let counter = VisitorCounter::with_clock(
            Arc::clone(&connector),
            Arc::new(FixedClock(at(2025, 9, 3, 10, 0, 0))),
        );

        assert_eq!(counter.current_counts().await.unwrap(), None);
        // Reading must not have created the record
        assert_eq!(counter.current_counts().await.unwrap(), None);

        let visited = counter.handle_visit().await.unwrap();
        assert_eq!(counter.current_counts().await.unwrap(), Some(visited.clone()));
        assert_eq!(counter.current_counts().await.unwrap(), Some(visited));
    }

    #[test]
    fn test_connect_errors_map_to_counter_errors() {
        let err = CounterError::from(ConnectError::MissingConnectionString);
        assert!(matches!(err, CounterError::Configuration(_)));

        let err = CounterError::from(ConnectError::Open(StoreError::InvalidRecord(
            "bad".to_string(),
        )));
        assert!(matches!(err, CounterError::Store(_)));
    }
}
