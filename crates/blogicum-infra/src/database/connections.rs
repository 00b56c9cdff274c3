use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

/// Invalid database settings in the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Configuration for the content database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub sql_logging: bool,
}

impl DatabaseConfig {
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 100;
    pub const DEFAULT_MIN_CONNECTIONS: u32 = 10;
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Load configuration from environment variables.
    ///
    /// Returns `Ok(None)` when `DATABASE_URL` is not set.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from explicit `(name, value)` pairs.
    ///
    /// Recognised variables: `DATABASE_URL`, `DB_MAX_CONNECTIONS`,
    /// `DB_MIN_CONNECTIONS`, `DB_CONNECT_TIMEOUT_SECS`, `DB_SQL_LOGGING`.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Option<Self>, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut url = None;
        let mut max_connections = Self::DEFAULT_MAX_CONNECTIONS;
        let mut min_connections = Self::DEFAULT_MIN_CONNECTIONS;
        let mut connect_timeout_secs = Self::DEFAULT_CONNECT_TIMEOUT_SECS;
        let mut sql_logging = true;

        for (key, value) in vars {
            let value = value.into();
            match key.as_ref() {
                "DATABASE_URL" => url = Some(value),
                "DB_MAX_CONNECTIONS" => max_connections = parse("DB_MAX_CONNECTIONS", value)?,
                "DB_MIN_CONNECTIONS" => min_connections = parse("DB_MIN_CONNECTIONS", value)?,
                "DB_CONNECT_TIMEOUT_SECS" => {
                    connect_timeout_secs = parse("DB_CONNECT_TIMEOUT_SECS", value)?
                }
                "DB_SQL_LOGGING" => sql_logging = value != "false" && value != "0",
                _ => {}
            }
        }

        Ok(url.map(|url| Self {
            url,
            max_connections,
            min_connections: min_connections.min(max_connections),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            sql_logging,
        }))
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

/// Open the connection pool described by `config`.
#[cfg(feature = "postgres")]
pub async fn connect(config: &DatabaseConfig) -> Result<DbConn, DbErr> {
    tracing::info!("Initializing database connection...");

    let opts = ConnectOptions::new(&config.url)
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(config.sql_logging)
        .to_owned();

    let conn = Database::connect(opts).await?;
    tracing::info!(
        "Database connected (pool: {}..{})",
        config.min_connections,
        config.max_connections
    );

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_url_means_no_database() {
        let config = DatabaseConfig::from_vars([("DB_MAX_CONNECTIONS", "5")]).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_defaults() {
        let config = DatabaseConfig::from_vars([("DATABASE_URL", "postgres://localhost/blogicum")])
            .unwrap()
            .unwrap();

        assert_eq!(config.url, "postgres://localhost/blogicum");
        assert_eq!(config.max_connections, 100);
        assert_eq!(config.min_connections, 10);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.sql_logging);
    }

    #[test]
    fn test_overrides() {
        let config = DatabaseConfig::from_vars([
            ("DATABASE_URL", "postgres://db/blogicum"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("DB_CONNECT_TIMEOUT_SECS", " 3 "),
            ("DB_SQL_LOGGING", "false"),
        ])
        .unwrap()
        .unwrap();

        assert_eq!(config.max_connections, 4);
        // Never above the pool ceiling.
        assert_eq!(config.min_connections, 4);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(!config.sql_logging);
    }

    #[test]
    fn test_invalid_number() {
        let err = DatabaseConfig::from_vars([
            ("DATABASE_URL", "postgres://db/blogicum"),
            ("DB_MIN_CONNECTIONS", "many"),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS",
                ..
            }
        ));
    }
}
