//! Run execution engine
//!
//! Owns the full lifecycle of one run: pre-flight authorization, run
//! creation, the batch loop with per-batch durable checkpoints and an
//! optional inter-batch pause, and the single terminal transition to
//! `completed` or `failed`.
//!
//! A run is one sequential control flow; batch k+1 is only generated
//! after batch k's count has been checkpointed. Concurrent runs are
//! independent flows sharing nothing but the repositories, which key
//! every update by run id. There is no retry anywhere in here: the
//! first synthesis or persistence fault aborts the run, marks it
//! `failed` best-effort, and surfaces the original cause.

use crate::adapters::generator::DataGenerator;
use crate::domain::{Field, RunOutcome, RunSettings, RunStatus};
use crate::persistence::{ConfigRepository, PersistenceError, RunRepository};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to callers of `start_run`
#[derive(Debug, Error)]
pub enum RunError {
    /// Caller does not own the target config. Pre-flight; no run row
    /// exists.
    #[error("Caller does not own config '{config_id}'")]
    Unauthorized { config_id: String },

    /// Config does not exist. Pre-flight; no run row exists.
    #[error("Configuration not found: '{0}'")]
    NotFound(String),

    /// Settings violate the documented constraints. Pre-flight.
    #[error("Invalid run settings: {0}")]
    InvalidSettings(String),

    /// Persistence fault before a run row existed (config lookup or
    /// run creation)
    #[error("Store error: {0}")]
    Store(#[from] PersistenceError),

    /// A fault during generation or checkpointing. The run has been
    /// marked `failed` (best-effort) with the last checkpointed count.
    #[error("Generation failed for run '{run_id}': {source}")]
    GenerationFailed {
        run_id: String,
        #[source]
        source: anyhow::Error,
    },
}

impl RunError {
    /// Convert to HTTP status code for API responses
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::Unauthorized { .. } => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidSettings(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(e) => e.status_code(),
            Self::GenerationFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Orchestrates run execution against injected repositories
pub struct RunEngine {
    configs: Arc<dyn ConfigRepository>,
    runs: Arc<dyn RunRepository>,
    generator: DataGenerator,
}

impl RunEngine {
    pub fn new(configs: Arc<dyn ConfigRepository>, runs: Arc<dyn RunRepository>) -> Self {
        Self {
            configs,
            runs,
            generator: DataGenerator::new(),
        }
    }

    /// Execute a run of `config_id` on behalf of `caller_id`.
    ///
    /// Validates settings and ownership before creating any state. On
    /// success the run is `completed` with exactly
    /// `settings.record_count` records checkpointed; on a mid-run
    /// fault the run is `failed` with the last durable count and the
    /// underlying cause is attached to the returned error.
    pub async fn start_run(
        &self,
        config_id: &str,
        caller_id: &str,
        settings: RunSettings,
    ) -> Result<RunOutcome, RunError> {
        settings.validate().map_err(RunError::InvalidSettings)?;

        let config = self
            .configs
            .get(config_id)
            .await?
            .ok_or_else(|| RunError::NotFound(config_id.to_string()))?;

        if config.owner_id != caller_id {
            return Err(RunError::Unauthorized {
                config_id: config_id.to_string(),
            });
        }

        let run = self.runs.create_run(&config.id, &config.owner_id).await?;
        tracing::info!(
            run_id = %run.id,
            config_id = %config.id,
            record_count = settings.record_count,
            batch_size = settings.batch_size,
            "starting run"
        );

        match self
            .run_to_completion(&run.id, &config.data.fields, settings)
            .await
        {
            Ok(generated) => {
                tracing::info!(run_id = %run.id, records = generated, "run completed");
                Ok(RunOutcome {
                    run_id: run.id,
                    records_generated: generated,
                })
            }
            Err(cause) => {
                tracing::error!(run_id = %run.id, error = %cause, "run failed");

                // Best-effort terminal transition. If this update fails
                // too, the run stays `running` with a stale checkpoint
                // and has to be reconciled externally.
                let end_time = chrono::Utc::now().to_rfc3339();
                if let Err(finalize_err) = self
                    .runs
                    .finalize_run(&run.id, RunStatus::Failed, &end_time)
                    .await
                {
                    tracing::warn!(
                        run_id = %run.id,
                        error = %finalize_err,
                        "could not mark run as failed; leaving stale state"
                    );
                }

                Err(RunError::GenerationFailed {
                    run_id: run.id,
                    source: cause,
                })
            }
        }
    }

    /// The batch loop plus the `completed` finalization.
    ///
    /// Any error out of here means the run must be marked `failed`;
    /// everything checkpointed before the error stays durable.
    async fn run_to_completion(
        &self,
        run_id: &str,
        fields: &[Field],
        settings: RunSettings,
    ) -> anyhow::Result<u64> {
        let mut generated: u64 = 0;

        while generated < settings.record_count {
            // Final batch truncates to the remainder; never overshoot
            let batch_size = settings.batch_size.min(settings.record_count - generated);
            let batch = self.generator.generate_batch(fields, batch_size as usize);
            tracing::debug!(run_id, records = batch.len(), "generated batch");

            generated += batch.len() as u64;
            self.runs.update_progress(run_id, generated).await?;

            if settings.delay_between_batches > 0 {
                tokio::time::sleep(Duration::from_millis(settings.delay_between_batches)).await;
            }
        }

        let end_time = chrono::Utc::now().to_rfc3339();
        self.runs
            .finalize_run(run_id, RunStatus::Completed, &end_time)
            .await?;

        Ok(generated)
    }
}
