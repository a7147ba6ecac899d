//! Database Module
//!
//! Embedded SurrealDB (RocksDB backend) connection handling.

pub mod models;

use crate::config::Config;
use crate::utils::AppResult;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Open the embedded database under the configured working directory
pub async fn connect(config: &Config) -> AppResult<Surreal<Db>> {
    let db: Surreal<Db> = Surreal::new::<RocksDb>(config.data_dir()).await?;
    db.use_ns(config.namespace.as_str())
        .use_db(config.database.as_str())
        .await?;
    tracing::info!(path = %config.data_dir(), "Database connection established");
    Ok(db)
}
