//! SQLite user record store

use async_trait::async_trait;
use dirgate_core::types::ProfileRow;
use dirgate_core::{Error, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::traits::UserRecordStore;

pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let store = Self { pool };
        store.init().await?;

        Ok(store)
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_profiles (
                user_id TEXT NOT NULL,
                company_code TEXT NOT NULL,
                organization_code TEXT NOT NULL,
                position_code TEXT,
                is_primary INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (user_id, company_code, organization_code)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_user_profiles_user ON user_profiles(user_id)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        info!("User record store initialized");
        Ok(())
    }

    /// Provision a profile row
    pub async fn insert_profile(&self, row: &ProfileRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, company_code, organization_code, position_code, is_primary)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.user_id)
        .bind(&row.company_code)
        .bind(&row.organization_code)
        .bind(&row.position_code)
        .bind(row.is_primary)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                Error::InvalidArgument(format!(
                    "Profile row already exists: {}/{}/{}",
                    row.user_id, row.company_code, row.organization_code
                ))
            } else {
                Error::DatabaseError(e.to_string())
            }
        })?;

        debug!("Provisioned profile row for user: {}", row.user_id);
        Ok(())
    }

    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<ProfileRow>> {
        let rows: Vec<(String, String, String, Option<String>, bool)> = sqlx::query_as(
            r#"
            SELECT user_id, company_code, organization_code, position_code, is_primary
            FROM user_profiles
            WHERE user_id = ?
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
impl UserRecordStore for SqliteUserStore {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<ProfileRow>> {
        SqliteUserStore::find_by_user_id(self, user_id).await
    }
}
