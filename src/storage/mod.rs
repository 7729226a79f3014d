pub mod connector;
pub mod memory;
pub mod postgres;
pub mod sqlite;
pub mod trait_def;

mod row;

pub use connector::{ConnectError, TableConnector};
pub use memory::MemoryTable;
pub use postgres::PostgresTable;
pub use sqlite::SqliteTable;
pub use trait_def::{Lookup, StoreError, StoreResult, TableStore};
