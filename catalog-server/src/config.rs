//! Environment-driven configuration

/// Runtime configuration for the catalog server
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory; the embedded database lives under `<work_dir>/data`
    pub work_dir: String,
    /// SurrealDB namespace
    pub namespace: String,
    /// SurrealDB database name
    pub database: String,
    /// Log level filter (trace/debug/info/warn/error)
    pub log_level: String,
    /// Optional directory for daily-rolling log files
    pub log_dir: Option<String>,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/bazaar".into()),
            namespace: std::env::var("DB_NAMESPACE").unwrap_or_else(|_| "bazaar".into()),
            database: std::env::var("DB_NAME").unwrap_or_else(|_| "catalog".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Create a config with a custom working directory (tests use this)
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn data_dir(&self) -> String {
        format!("{}/data", self.work_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
