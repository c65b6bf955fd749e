//! Repository for run execution state
//!
//! The run engine drives every mutation here: `create_run` opens a run
//! in `running` with a zero count, `update_progress` is the per-batch
//! checkpoint, and `finalize_run` performs the single terminal
//! transition. Each call is one atomic statement, durable on return.

use crate::domain::{Run, RunStatus};
use crate::persistence::error::PersistenceError;
use crate::persistence::pool::ConnectionPool;
use async_trait::async_trait;
use sqlx::Row;

/// Repository trait for run operations
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// Create a run in status `running` with a zero record count and
    /// the start time set to now
    async fn create_run(&self, config_id: &str, owner_id: &str) -> Result<Run, PersistenceError>;

    /// Checkpoint the cumulative record count for a running run
    async fn update_progress(
        &self,
        run_id: &str,
        records_count: u64,
    ) -> Result<(), PersistenceError>;

    /// Move a run to a terminal status, setting status and end time in
    /// one statement
    async fn finalize_run(
        &self,
        run_id: &str,
        status: RunStatus,
        end_time: &str,
    ) -> Result<(), PersistenceError>;

    /// Get a run by ID
    async fn get(&self, id: &str) -> Result<Option<Run>, PersistenceError>;

    /// List runs for a config, newest first
    async fn list_by_config(
        &self,
        config_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Run>, PersistenceError>;
}

/// SQLx-based implementation of RunRepository
pub struct SqlxRunRepository {
    pool: ConnectionPool,
}

impl SqlxRunRepository {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Parse a row into a Run
    fn parse_row(row: &sqlx::any::AnyRow) -> Result<Run, PersistenceError> {
        let status_str: String = row.try_get("status")?;
        let status: RunStatus = status_str
            .parse()
            .map_err(PersistenceError::Internal)?;
        let records_count: i64 = row.try_get("records_count")?;

        Ok(Run {
            id: row.try_get("id")?,
            config_id: row.try_get("config_id")?,
            owner_id: row.try_get("owner_id")?,
            status,
            records_count: records_count.max(0) as u64,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
        })
    }
}

#[async_trait]
impl RunRepository for SqlxRunRepository {
    async fn create_run(&self, config_id: &str, owner_id: &str) -> Result<Run, PersistenceError> {
        let id = uuid::Uuid::new_v4().to_string();
        let start_time = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO runs (id, config_id, owner_id, status, records_count, start_time) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(config_id)
        .bind(owner_id)
        .bind(RunStatus::Running.as_str())
        .bind(0_i64)
        .bind(&start_time)
        .execute(self.pool.pool())
        .await?;

        Ok(Run {
            id,
            config_id: config_id.to_string(),
            owner_id: owner_id.to_string(),
            status: RunStatus::Running,
            records_count: 0,
            start_time,
            end_time: None,
        })
    }

    async fn update_progress(
        &self,
        run_id: &str,
        records_count: u64,
    ) -> Result<(), PersistenceError> {
        let result = sqlx::query("UPDATE runs SET records_count = ? WHERE id = ?")
            .bind(records_count as i64)
            .bind(run_id)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("run", run_id));
        }

        Ok(())
    }

    async fn finalize_run(
        &self,
        run_id: &str,
        status: RunStatus,
        end_time: &str,
    ) -> Result<(), PersistenceError> {
        if !status.is_terminal() {
            return Err(PersistenceError::Internal(format!(
                "Cannot finalize run '{}' to non-terminal status '{}'",
                run_id, status
            )));
        }

        let result = sqlx::query("UPDATE runs SET status = ?, end_time = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(end_time)
            .bind(run_id)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("run", run_id));
        }

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Run>, PersistenceError> {
        let row = sqlx::query("SELECT * FROM runs WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(Self::parse_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_by_config(
        &self,
        config_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Run>, PersistenceError> {
        let rows = sqlx::query(
            "SELECT * FROM runs WHERE config_id = ? ORDER BY start_time DESC LIMIT ? OFFSET ?",
        )
        .bind(config_id)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(self.pool.pool())
        .await?;

        let mut runs = Vec::new();
        for row in rows {
            runs.push(Self::parse_row(&row)?);
        }

        Ok(runs)
    }
}
