//! Database migrations for the persistence layer

use crate::persistence::error::PersistenceError;
use crate::persistence::pool::ConnectionPool;
use sqlx::Row;

/// Migration 001: generator configs
const MIGRATION_001_CONFIGS: &str = r#"
-- Generator configs (field schemas plus destination metadata)
CREATE TABLE IF NOT EXISTS configs (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    owner_id TEXT NOT NULL,
    definition TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_configs_owner ON configs(owner_id);
CREATE INDEX IF NOT EXISTS idx_configs_created ON configs(created_at);
"#;

/// Migration 002: run history
const MIGRATION_002_RUNS: &str = r#"
-- Runs (one row per execution, progress checkpointed while running)
CREATE TABLE IF NOT EXISTS runs (
    id TEXT PRIMARY KEY,
    config_id TEXT NOT NULL,
    owner_id TEXT NOT NULL,
    status TEXT NOT NULL,
    records_count INTEGER NOT NULL DEFAULT 0,
    start_time TEXT NOT NULL,
    end_time TEXT,
    FOREIGN KEY (config_id) REFERENCES configs(id)
);

CREATE INDEX IF NOT EXISTS idx_runs_config ON runs(config_id);
CREATE INDEX IF NOT EXISTS idx_runs_owner ON runs(owner_id);
CREATE INDEX IF NOT EXISTS idx_runs_status ON runs(status);
CREATE INDEX IF NOT EXISTS idx_runs_start ON runs(start_time);
"#;

/// Migration definition
struct Migration {
    name: &'static str,
    sql: &'static str,
    checksum: &'static str,
}

/// Get all migrations in order
fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            name: "001_configs",
            sql: MIGRATION_001_CONFIGS,
            checksum: "v1",
        },
        Migration {
            name: "002_runs",
            sql: MIGRATION_002_RUNS,
            checksum: "v1",
        },
    ]
}

/// Migration runner for the persistence layer
pub struct MigrationRunner {
    pool: ConnectionPool,
}

impl MigrationRunner {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations
    pub async fn migrate_up(&self) -> Result<MigrationResult, PersistenceError> {
        let migrations = get_migrations();
        let mut applied = 0;
        let mut skipped = 0;

        self.ensure_migrations_table().await?;

        for migration in migrations {
            if self.is_migration_applied(migration.name).await? {
                tracing::debug!("Migration '{}' already applied, skipping", migration.name);
                skipped += 1;
                continue;
            }

            tracing::info!("Applying migration: {}", migration.name);

            // SQLite's Any driver wants statements executed one at a time
            for statement in migration.sql.split(';') {
                // Drop comment lines so a commented statement is not
                // mistaken for an empty one
                let statement = statement
                    .lines()
                    .filter(|line| !line.trim_start().starts_with("--"))
                    .collect::<Vec<_>>()
                    .join("\n");
                let statement = statement.trim();
                if statement.is_empty() {
                    continue;
                }

                sqlx::query(statement)
                    .execute(self.pool.pool())
                    .await
                    .map_err(|e| {
                        PersistenceError::Migration(format!(
                            "Failed to execute migration '{}': {}",
                            migration.name, e
                        ))
                    })?;
            }

            self.record_migration(migration.name, migration.checksum)
                .await?;

            tracing::info!("Migration '{}' applied successfully", migration.name);
            applied += 1;
        }

        Ok(MigrationResult { applied, skipped })
    }

    /// Ensure the migrations tracking table exists
    async fn ensure_migrations_table(&self) -> Result<(), PersistenceError> {
        let sql = r#"
            CREATE TABLE IF NOT EXISTS _synthrun_migrations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                applied_at TEXT NOT NULL,
                checksum TEXT NOT NULL
            )
        "#;

        sqlx::query(sql)
            .execute(self.pool.pool())
            .await
            .map_err(|e| {
                PersistenceError::Migration(format!("Failed to create migrations table: {}", e))
            })?;

        Ok(())
    }

    /// Check if a migration has been applied
    async fn is_migration_applied(&self, name: &str) -> Result<bool, PersistenceError> {
        let result =
            sqlx::query("SELECT COUNT(*) as count FROM _synthrun_migrations WHERE name = ?")
                .bind(name)
                .fetch_one(self.pool.pool())
                .await
                .map_err(|e| {
                    PersistenceError::Migration(format!("Failed to check migration status: {}", e))
                })?;

        let count: i64 = result.try_get("count").unwrap_or(0);
        Ok(count > 0)
    }

    /// Record a migration as applied
    async fn record_migration(&self, name: &str, checksum: &str) -> Result<(), PersistenceError> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO _synthrun_migrations (name, applied_at, checksum) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(&now)
        .bind(checksum)
        .execute(self.pool.pool())
        .await
        .map_err(|e| PersistenceError::Migration(format!("Failed to record migration: {}", e)))?;

        Ok(())
    }
}

/// Result of running migrations
#[derive(Debug)]
pub struct MigrationResult {
    /// Number of migrations applied
    pub applied: usize,
    /// Number of migrations skipped (already applied)
    pub skipped: usize,
}
