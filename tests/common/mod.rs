//! In-memory repository implementations shared by the integration
//! tests. They record every checkpoint in order and can be told to
//! fail at a specific point so the failure paths of the run engine can
//! be exercised without a database.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use synthrun::domain::{ConfigData, Field, FieldType, GeneratorConfig, Run, RunStatus};
use synthrun::persistence::{ConfigRepository, PersistenceError, RunRepository};

pub fn field(name: &str, field_type: FieldType) -> Field {
    Field {
        name: name.to_string(),
        field_type,
        options: None,
    }
}

pub fn sample_config(id: &str, owner_id: &str) -> GeneratorConfig {
    GeneratorConfig {
        id: id.to_string(),
        name: "customers".to_string(),
        owner_id: owner_id.to_string(),
        data: ConfigData {
            fields: vec![
                field("first", FieldType::FirstName),
                field("email", FieldType::Email),
                field("score", FieldType::Number),
            ],
            description: None,
            destination: None,
            status: Some("active".to_string()),
        },
        created_at: "2026-01-01T00:00:00Z".to_string(),
        updated_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

#[derive(Default)]
pub struct InMemoryConfigRepository {
    configs: Mutex<HashMap<String, GeneratorConfig>>,
}

impl InMemoryConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        let repo = Self::new();
        repo.configs
            .lock()
            .unwrap()
            .insert(config.id.clone(), config);
        repo
    }
}

#[async_trait]
impl ConfigRepository for InMemoryConfigRepository {
    async fn get(&self, id: &str) -> Result<Option<GeneratorConfig>, PersistenceError> {
        Ok(self.configs.lock().unwrap().get(id).cloned())
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<GeneratorConfig>, PersistenceError> {
        let mut configs: Vec<GeneratorConfig> = self
            .configs
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        configs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(configs)
    }

    async fn create(
        &self,
        name: &str,
        owner_id: &str,
        data: &ConfigData,
    ) -> Result<GeneratorConfig, PersistenceError> {
        let now = chrono::Utc::now().to_rfc3339();
        let config = GeneratorConfig {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            owner_id: owner_id.to_string(),
            data: data.clone(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.configs
            .lock()
            .unwrap()
            .insert(config.id.clone(), config.clone());
        Ok(config)
    }

    async fn update(
        &self,
        id: &str,
        name: &str,
        data: &ConfigData,
    ) -> Result<GeneratorConfig, PersistenceError> {
        let mut configs = self.configs.lock().unwrap();
        let config = configs
            .get_mut(id)
            .ok_or_else(|| PersistenceError::not_found("config", id))?;
        config.name = name.to_string();
        config.data = data.clone();
        config.updated_at = chrono::Utc::now().to_rfc3339();
        Ok(config.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool, PersistenceError> {
        Ok(self.configs.lock().unwrap().remove(id).is_some())
    }
}

/// In-memory run store that records checkpoints in order and can
/// inject faults at a chosen checkpoint or at finalization.
#[derive(Default)]
pub struct InMemoryRunRepository {
    runs: Mutex<HashMap<String, Run>>,
    /// Every records_count passed to update_progress, in call order
    checkpoints: Mutex<Vec<u64>>,
    create_calls: AtomicUsize,
    /// 1-based checkpoint call number that should fail (0 = never)
    fail_on_checkpoint: AtomicUsize,
    /// Whether finalize_run should fail
    fail_finalize: std::sync::atomic::AtomicBool,
}

impl InMemoryRunRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on_checkpoint(&self, call_number: usize) {
        self.fail_on_checkpoint.store(call_number, Ordering::SeqCst);
    }

    pub fn fail_finalize(&self, fail: bool) {
        self.fail_finalize.store(fail, Ordering::SeqCst);
    }

    pub fn checkpoints(&self) -> Vec<u64> {
        self.checkpoints.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn run(&self, id: &str) -> Option<Run> {
        self.runs.lock().unwrap().get(id).cloned()
    }

    pub fn single_run(&self) -> Run {
        let runs = self.runs.lock().unwrap();
        assert_eq!(runs.len(), 1, "expected exactly one run");
        runs.values().next().unwrap().clone()
    }
}

#[async_trait]
impl RunRepository for InMemoryRunRepository {
    async fn create_run(&self, config_id: &str, owner_id: &str) -> Result<Run, PersistenceError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let run = Run {
            id: uuid::Uuid::new_v4().to_string(),
            config_id: config_id.to_string(),
            owner_id: owner_id.to_string(),
            status: RunStatus::Running,
            records_count: 0,
            start_time: chrono::Utc::now().to_rfc3339(),
            end_time: None,
        };
        self.runs
            .lock()
            .unwrap()
            .insert(run.id.clone(), run.clone());
        Ok(run)
    }

    async fn update_progress(
        &self,
        run_id: &str,
        records_count: u64,
    ) -> Result<(), PersistenceError> {
        let call_number = {
            let mut checkpoints = self.checkpoints.lock().unwrap();
            checkpoints.push(records_count);
            checkpoints.len()
        };

        if self.fail_on_checkpoint.load(Ordering::SeqCst) == call_number {
            // The failing checkpoint is not durable
            self.checkpoints.lock().unwrap().pop();
            return Err(PersistenceError::Internal(
                "injected checkpoint fault".to_string(),
            ));
        }

        let mut runs = self.runs.lock().unwrap();
        let run = runs
            .get_mut(run_id)
            .ok_or_else(|| PersistenceError::not_found("run", run_id))?;
        run.records_count = records_count;
        Ok(())
    }

    async fn finalize_run(
        &self,
        run_id: &str,
        status: RunStatus,
        end_time: &str,
    ) -> Result<(), PersistenceError> {
        if self.fail_finalize.load(Ordering::SeqCst) {
            return Err(PersistenceError::Internal(
                "injected finalize fault".to_string(),
            ));
        }

        let mut runs = self.runs.lock().unwrap();
        let run = runs
            .get_mut(run_id)
            .ok_or_else(|| PersistenceError::not_found("run", run_id))?;
        run.status = status;
        run.end_time = Some(end_time.to_string());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Run>, PersistenceError> {
        Ok(self.runs.lock().unwrap().get(id).cloned())
    }

    async fn list_by_config(
        &self,
        config_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Run>, PersistenceError> {
        let mut runs: Vec<Run> = self
            .runs
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.config_id == config_id)
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(runs.into_iter().skip(offset).take(limit).collect())
    }
}
