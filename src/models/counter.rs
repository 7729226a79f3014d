use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format_timestamp;

/// Partition key of the single counter record
pub const PARTITION_KEY: &str = "AnalyticsType";

/// Row key of the single counter record
pub const ROW_KEY: &str = "MetricID";

/// The persisted visitor counter.
///
/// Exactly one of these exists per table, addressed by
/// ([`PARTITION_KEY`], [`ROW_KEY`]). Every write replaces all fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterRecord {
    pub partition_key: String,
    pub row_key: String,
    /// Visitors since the record was created
    pub total_visitors: i64,
    /// Visitors since the last UTC day boundary
    pub visitors_today: i64,
    pub last_visited: DateTime<Utc>,
}

impl CounterRecord {
    /// Record under the fixed key pair with the given counters.
    pub fn new(total_visitors: i64, visitors_today: i64, last_visited: DateTime<Utc>) -> Self {
        Self {
            partition_key: PARTITION_KEY.to_string(),
            row_key: ROW_KEY.to_string(),
            total_visitors,
            visitors_today,
            last_visited,
        }
    }
}

/// Body returned by `GET /api/getVisitorCount`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitResponse {
    /// Visitors today, after this visit
    pub visitor_count: i64,
    pub total_visitors: i64,
    pub last_visited: String,
}

impl From<&CounterRecord> for VisitResponse {
    fn from(record: &CounterRecord) -> Self {
        Self {
            visitor_count: record.visitors_today,
            total_visitors: record.total_visitors,
            last_visited: format_timestamp(record.last_visited),
        }
    }
}
