//! Repository for generator configs
//!
//! A config row stores its field schema as a JSON document in the
//! `definition` column; the ordered field list is parsed out on read.

use crate::domain::{ConfigData, GeneratorConfig};
use crate::persistence::error::PersistenceError;
use crate::persistence::pool::ConnectionPool;
use async_trait::async_trait;
use sqlx::Row;

/// Repository trait for generator config operations
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// Get a config by ID
    async fn get(&self, id: &str) -> Result<Option<GeneratorConfig>, PersistenceError>;

    /// List configs owned by a user, newest first
    async fn list_by_owner(&self, owner_id: &str)
        -> Result<Vec<GeneratorConfig>, PersistenceError>;

    /// Create a new config; assigns the id and timestamps
    async fn create(
        &self,
        name: &str,
        owner_id: &str,
        data: &ConfigData,
    ) -> Result<GeneratorConfig, PersistenceError>;

    /// Replace a config's name and schema body
    async fn update(
        &self,
        id: &str,
        name: &str,
        data: &ConfigData,
    ) -> Result<GeneratorConfig, PersistenceError>;

    /// Delete a config by ID
    async fn delete(&self, id: &str) -> Result<bool, PersistenceError>;
}

/// SQLx-based implementation of ConfigRepository
pub struct SqlxConfigRepository {
    pool: ConnectionPool,
}

impl SqlxConfigRepository {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Parse a row into a GeneratorConfig
    fn parse_row(row: &sqlx::any::AnyRow) -> Result<GeneratorConfig, PersistenceError> {
        let definition: String = row.try_get("definition")?;
        let data: ConfigData = serde_json::from_str(&definition)?;

        Ok(GeneratorConfig {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            owner_id: row.try_get("owner_id")?,
            data,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl ConfigRepository for SqlxConfigRepository {
    async fn get(&self, id: &str) -> Result<Option<GeneratorConfig>, PersistenceError> {
        let row = sqlx::query("SELECT * FROM configs WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(Self::parse_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<GeneratorConfig>, PersistenceError> {
        let rows = sqlx::query("SELECT * FROM configs WHERE owner_id = ? ORDER BY created_at DESC")
            .bind(owner_id)
            .fetch_all(self.pool.pool())
            .await?;

        let mut configs = Vec::new();
        for row in rows {
            configs.push(Self::parse_row(&row)?);
        }

        Ok(configs)
    }

    async fn create(
        &self,
        name: &str,
        owner_id: &str,
        data: &ConfigData,
    ) -> Result<GeneratorConfig, PersistenceError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let definition = serde_json::to_string(data)?;

        sqlx::query(
            "INSERT INTO configs (id, name, owner_id, definition, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(owner_id)
        .bind(&definition)
        .bind(&now)
        .bind(&now)
        .execute(self.pool.pool())
        .await?;

        Ok(GeneratorConfig {
            id,
            name: name.to_string(),
            owner_id: owner_id.to_string(),
            data: data.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn update(
        &self,
        id: &str,
        name: &str,
        data: &ConfigData,
    ) -> Result<GeneratorConfig, PersistenceError> {
        let now = chrono::Utc::now().to_rfc3339();
        let definition = serde_json::to_string(data)?;

        let result = sqlx::query(
            "UPDATE configs SET name = ?, definition = ?, updated_at = ? WHERE id = ?",
        )
        .bind(name)
        .bind(&definition)
        .bind(&now)
        .bind(id)
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("config", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| PersistenceError::not_found("config", id))
    }

    async fn delete(&self, id: &str) -> Result<bool, PersistenceError> {
        let result = sqlx::query("DELETE FROM configs WHERE id = ?")
            .bind(id)
            .execute(self.pool.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
