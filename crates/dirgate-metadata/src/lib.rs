//! Local user record storage for Dirgate
//!
//! Supports SQLite and PostgreSQL backends.

pub mod postgres;
pub mod repository;
pub mod traits;

pub use postgres::PostgresUserStore;
pub use repository::SqliteUserStore;
pub use traits::*;

use dirgate_core::config::DatabaseConfig;
use dirgate_core::{Error, Result};
use std::sync::Arc;

/// Open the store matching the database URL scheme
pub async fn connect_store(config: &DatabaseConfig) -> Result<Arc<dyn UserRecordStore>> {
    let url = config.url.as_str();

    if url.starts_with("sqlite:") {
        let store = SqliteUserStore::new(url, config.max_connections).await?;
        Ok(Arc::new(store))
    } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        let store = PostgresUserStore::new(url, config.max_connections).await?;
        Ok(Arc::new(store))
    } else {
        Err(Error::UnsupportedDatabase(redact_url(url)))
    }
}

/// Drop credentials from a database URL before it is logged or reported
pub fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
