use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod auth;

/// A named, typed slot in a schema describing what kind of synthetic
/// value to produce for it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Reserved per-type generation options; carried but not consumed
    /// by the generator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// The closed set of field types the generator recognizes.
///
/// Anything else deserializes to `Unknown` and falls back to a lorem
/// word at generation time; an unrecognized type is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    FirstName,
    LastName,
    Email,
    Phone,
    Company,
    Address,
    Date,
    Number,
    Boolean,
    Uuid,
    #[serde(other)]
    Unknown,
}

/// Schema body of a generator config: the ordered field list plus
/// presentation metadata and an opaque destination description.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConfigData {
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Target destination; stored opaquely, delivery is not implemented.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A stored generator configuration owned by a user.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneratorConfig {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub data: ConfigData,
    /// Creation timestamp (RFC3339)
    pub created_at: String,
    /// Last update timestamp (RFC3339)
    pub updated_at: String,
}

/// Lifecycle status of a run.
///
/// `Running` is the only initial state; `Completed` and `Failed` are
/// terminal and mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid run status: {}", s)),
        }
    }
}

/// One execution instance of a config, tracked to a terminal status.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Run {
    pub id: String,
    pub config_id: String,
    pub owner_id: String,
    pub status: RunStatus,
    /// Cumulative records generated so far; frozen once terminal.
    pub records_count: u64,
    /// Start timestamp (RFC3339), set at creation.
    pub start_time: String,
    /// End timestamp (RFC3339), set exactly once on the terminal
    /// transition. None while running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// Caller-supplied settings for one run invocation. Not persisted.
///
/// Wire shape is camelCase with all three fields required; the delay is
/// in milliseconds.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct RunSettings {
    pub record_count: u64,
    pub batch_size: u64,
    pub delay_between_batches: u64,
}

impl RunSettings {
    /// Check the documented constraints: both counts must be positive.
    /// A batch size larger than the total is allowed; the first batch
    /// simply truncates to the remainder.
    pub fn validate(&self) -> Result<(), String> {
        if self.record_count == 0 {
            return Err("recordCount must be a positive integer".to_string());
        }
        if self.batch_size == 0 {
            return Err("batchSize must be a positive integer".to_string());
        }
        Ok(())
    }
}

/// Successful result of a run invocation.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub run_id: String,
    pub records_generated: u64,
}
