use std::sync::Arc;

use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::{StoreBackend, StoreConfig, CONNECTION_ENV};
use crate::storage::{MemoryTable, PostgresTable, SqliteTable, StoreError, TableStore};

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("no store connection string configured (set {})", CONNECTION_ENV)]
    MissingConnectionString,
    #[error("connection string does not name a supported backend (sqlite, postgres, memory)")]
    UnsupportedBackend,
    #[error("invalid table name '{0}': use letters, digits and underscores")]
    InvalidTableName(String),
    #[error("failed to open table store")]
    Open(#[source] StoreError),
}

/// Turns store configuration into a live [`TableStore`] on first use.
///
/// Configuration problems surface on every call rather than at startup.
/// A successful connection is cached and shared; a failed one is not, so
/// the next call tries again.
pub struct TableConnector {
    settings: StoreConfig,
    table: OnceCell<Arc<dyn TableStore>>,
}

impl TableConnector {
    pub fn new(settings: StoreConfig) -> Self {
        Self {
            settings,
            table: OnceCell::new(),
        }
    }

    /// Connector around an already opened store.
    pub fn with_table(table: Arc<dyn TableStore>) -> Self {
        Self {
            settings: StoreConfig {
                connection_string: None,
                table_name: StoreConfig::DEFAULT_TABLE_NAME.to_string(),
                max_connections: 1,
            },
            table: OnceCell::new_with(Some(table)),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.settings.table_name
    }

    pub async fn table(&self) -> Result<Arc<dyn TableStore>, ConnectError> {
        self.table
            .get_or_try_init(|| open(&self.settings))
            .await
            .map(Arc::clone)
    }
}

async fn open(settings: &StoreConfig) -> Result<Arc<dyn TableStore>, ConnectError> {
    let url = settings
        .connection_string
        .as_deref()
        .ok_or(ConnectError::MissingConnectionString)?;
    let backend =
        StoreBackend::from_connection_string(url).ok_or(ConnectError::UnsupportedBackend)?;

    let table_name = settings.table_name.as_str();
    if !is_valid_table_name(table_name) {
        return Err(ConnectError::InvalidTableName(table_name.to_string()));
    }

    let store: Arc<dyn TableStore> = match backend {
        StoreBackend::Sqlite => Arc::new(
            SqliteTable::new(url, table_name, settings.max_connections)
                .await
                .map_err(|e| ConnectError::Open(e.into()))?,
        ),
        StoreBackend::Postgres => Arc::new(
            PostgresTable::new(url, table_name, settings.max_connections)
                .await
                .map_err(|e| ConnectError::Open(e.into()))?,
        ),
        StoreBackend::Memory => Arc::new(MemoryTable::new()),
    };

    store.init().await.map_err(ConnectError::Open)?;
    info!(backend = ?backend, table = table_name, "Connected to table store");

    Ok(store)
}

fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
