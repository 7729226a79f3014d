mod counter;
mod timestamp;

pub use counter::{CounterRecord, VisitResponse, PARTITION_KEY, ROW_KEY};
pub use timestamp::{format_timestamp, parse_timestamp};
