//! Database row models and their domain conversions

use crate::domain::{ConfigData, GeneratorConfig, Run, RunStatus};
use serde::{Deserialize, Serialize};

/// Generator config as stored in the `configs` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRow {
    /// Unique identifier (UUID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Owner user id; immutable after creation
    pub owner_id: String,
    /// JSON serialized schema body (fields, description, destination)
    pub definition: String,
    /// Creation timestamp (RFC3339)
    pub created_at: String,
    /// Last update timestamp (RFC3339)
    pub updated_at: String,
}

impl TryFrom<ConfigRow> for GeneratorConfig {
    type Error = serde_json::Error;

    fn try_from(row: ConfigRow) -> Result<Self, Self::Error> {
        let data: ConfigData = serde_json::from_str(&row.definition)?;
        Ok(Self {
            id: row.id,
            name: row.name,
            owner_id: row.owner_id,
            data,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Run as stored in the `runs` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRow {
    /// Unique identifier (UUID)
    pub id: String,
    /// Config this run executed
    pub config_id: String,
    /// Owner user id, copied from the config at creation
    pub owner_id: String,
    /// Lifecycle status: running, completed, failed
    pub status: String,
    /// Cumulative records generated
    pub records_count: i64,
    /// Start timestamp (RFC3339)
    pub start_time: String,
    /// End timestamp (RFC3339), NULL while running
    pub end_time: Option<String>,
}

impl TryFrom<RunRow> for Run {
    type Error = String;

    fn try_from(row: RunRow) -> Result<Self, Self::Error> {
        let status: RunStatus = row.status.parse()?;
        Ok(Self {
            id: row.id,
            config_id: row.config_id,
            owner_id: row.owner_id,
            status,
            records_count: row.records_count.max(0) as u64,
            start_time: row.start_time,
            end_time: row.end_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_row_conversion() {
        let row = ConfigRow {
            id: "c1".to_string(),
            name: "users".to_string(),
            owner_id: "u1".to_string(),
            definition: r#"{"fields": [{"name": "email", "type": "email"}]}"#.to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };

        let config = GeneratorConfig::try_from(row).unwrap();
        assert_eq!(config.data.fields.len(), 1);
        assert_eq!(config.data.fields[0].name, "email");
    }

    #[test]
    fn test_run_row_rejects_unknown_status() {
        let row = RunRow {
            id: "r1".to_string(),
            config_id: "c1".to_string(),
            owner_id: "u1".to_string(),
            status: "queued".to_string(),
            records_count: 0,
            start_time: "2026-01-01T00:00:00Z".to_string(),
            end_time: None,
        };

        assert!(Run::try_from(row).is_err());
    }
}
