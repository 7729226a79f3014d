use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Environment variable holding the store connection string
pub const CONNECTION_ENV: &str = "CosmosDbConnection";

/// Accepted when [`CONNECTION_ENV`] is not set
pub const CONNECTION_ENV_ALIAS: &str = "VISITOR_STORE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub api_server: ServerConfig,
    pub cors: CorsConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Connection string for the table store. Optional at startup; every
    /// visit request fails while it is unset.
    pub connection_string: Option<String>,
    pub table_name: String,
    #[serde(default = "StoreConfig::default_max_connections")]
    pub max_connections: u32,
}

// Connection strings carry credentials; keep them out of logs.
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "<redacted>"),
            )
            .field("table_name", &self.table_name)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the counter from a browser.
    /// Empty or containing `*` means any origin.
    pub allowed_origins: Vec<String>,
}

impl StoreConfig {
    pub const DEFAULT_TABLE_NAME: &'static str = "visitor_counter";

    const fn default_max_connections() -> u32 {
        5
    }

    /// Config pointing at `connection_string` with default table settings
    pub fn with_connection(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: Some(connection_string.into()),
            table_name: Self::DEFAULT_TABLE_NAME.to_string(),
            max_connections: Self::default_max_connections(),
        }
    }
}

impl StoreBackend {
    /// Pick the backend from the connection string's URL scheme.
    pub fn from_connection_string(connection_string: &str) -> Option<Self> {
        let (scheme, _) = connection_string.split_once(':')?;
        match scheme.to_lowercase().as_str() {
            "sqlite" => Some(StoreBackend::Sqlite),
            "postgres" | "postgresql" => Some(StoreBackend::Postgres),
            "memory" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let connection_string = lookup(CONNECTION_ENV)
            .or_else(|| lookup(CONNECTION_ENV_ALIAS))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let table_name = lookup("VISITOR_TABLE_NAME")
            .unwrap_or_else(|| StoreConfig::DEFAULT_TABLE_NAME.to_string());

        let max_connections = match lookup("VISITOR_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .with_context(|| format!("VISITOR_MAX_CONNECTIONS must be a number, got '{v}'"))?,
            None => StoreConfig::default_max_connections(),
        };

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let api_port = lookup("API_PORT")
            .unwrap_or_else(|| "7071".to_string())
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            store: StoreConfig {
                connection_string,
                table_name,
                max_connections,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            cors: CorsConfig { allowed_origins },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_any_variables() {
        let config = config_from(&[]).unwrap();

        assert!(config.store.connection_string.is_none());
        assert_eq!(config.store.table_name, "visitor_counter");
        assert_eq!(config.store.max_connections, 5);
        assert_eq!(config.api_server.host, "127.0.0.1");
        assert_eq!(config.api_server.port, 7071);
        assert!(config.cors.allows_any_origin());
    }

    #[test]
    fn test_primary_connection_variable_wins_over_alias() {
        let config = config_from(&[
            ("CosmosDbConnection", "sqlite://counter.db"),
            ("VISITOR_STORE_URL", "memory://"),
        ])
        .unwrap();
        assert_eq!(
            config.store.connection_string.as_deref(),
            Some("sqlite://counter.db")
        );
    }

    #[test]
    fn test_alias_is_used_when_primary_missing() {
        let config = config_from(&[("VISITOR_STORE_URL", "memory://")]).unwrap();
        assert_eq!(config.store.connection_string.as_deref(), Some("memory://"));
    }

    #[test]
    fn test_blank_connection_string_counts_as_missing() {
        let config = config_from(&[("CosmosDbConnection", "   ")]).unwrap();
        assert!(config.store.connection_string.is_none());
    }

    #[test]
    fn test_bad_port_is_rejected() {
        assert!(config_from(&[("API_PORT", "seventy")]).is_err());
    }

    #[test]
    fn test_bad_pool_size_is_rejected() {
        assert!(config_from(&[("VISITOR_MAX_CONNECTIONS", "-1")]).is_err());
    }

    #[test]
    fn test_cors_origins_are_split_and_trimmed() {
        let config = config_from(&[(
            "CORS_ALLOWED_ORIGINS",
            "https://resume.example.com, https://www.example.com,",
        )])
        .unwrap();
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://resume.example.com", "https://www.example.com"]
        );
        assert!(!config.cors.allows_any_origin());
    }

    #[test]
    fn test_backend_from_scheme() {
        assert_eq!(
            StoreBackend::from_connection_string("sqlite::memory:"),
            Some(StoreBackend::Sqlite)
        );
        assert_eq!(
            StoreBackend::from_connection_string("postgresql://u:p@db/counter"),
            Some(StoreBackend::Postgres)
        );
        assert_eq!(
            StoreBackend::from_connection_string("MEMORY://"),
            Some(StoreBackend::Memory)
        );
        assert_eq!(
            StoreBackend::from_connection_string(
                "DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=k"
            ),
            None
        );
        assert_eq!(StoreBackend::from_connection_string("no-scheme"), None);
    }

    #[test]
    fn test_debug_output_hides_connection_string() {
        let store = StoreConfig::with_connection("postgres://user:secret@db/counter");
        let printed = format!("{store:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }
}
