//! PostgreSQL user record store
//!
//! Reads the `user_profiles` relation of an existing database; the schema is
//! owned by the provisioning side and never created here.

use async_trait::async_trait;
use dirgate_core::types::ProfileRow;
use dirgate_core::{Error, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use crate::traits::UserRecordStore;

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        info!("Connected to PostgreSQL user record store");
        Ok(Self { pool })
    }

    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<ProfileRow>> {
        // read-only lookup; isolation is left to the database
        let rows: Vec<(String, String, String, Option<String>, bool)> = sqlx::query_as(
            r#"
            SELECT user_id, company_code, organization_code, position_code, is_primary
            FROM user_profiles
            WHERE user_id = $1
            ORDER BY is_primary DESC, company_code, organization_code
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        debug!("Found {} profile rows for user: {}", rows.len(), user_id);

        Ok(rows
            .into_iter()
            .map(|r| ProfileRow {
                user_id: r.0,
                company_code: r.1,
                organization_code: r.2,
                position_code: r.3,
                is_primary: r.4,
            })
            .collect())
    }
}

#[async_trait]
impl UserRecordStore for PostgresUserStore {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<ProfileRow>> {
        PostgresUserStore::find_by_user_id(self, user_id).await
    }
}
