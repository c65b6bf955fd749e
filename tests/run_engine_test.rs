//! Run engine behavior: checkpoint ordering, truncation, terminal
//! transitions, and pre-flight failures.

mod common;

use common::{sample_config, InMemoryConfigRepository, InMemoryRunRepository};
use std::sync::Arc;
use synthrun::adapters::run_engine::{RunEngine, RunError};
use synthrun::domain::{RunSettings, RunStatus};

fn engine_with(
    configs: Arc<InMemoryConfigRepository>,
    runs: Arc<InMemoryRunRepository>,
) -> RunEngine {
    RunEngine::new(configs, runs)
}

fn settings(record_count: u64, batch_size: u64) -> RunSettings {
    RunSettings {
        record_count,
        batch_size,
        delay_between_batches: 0,
    }
}

#[tokio::test]
async fn test_run_checkpoints_in_order_and_completes() {
    let configs = Arc::new(InMemoryConfigRepository::with_config(sample_config(
        "cfg-1", "owner-1",
    )));
    let runs = Arc::new(InMemoryRunRepository::new());
    let engine = engine_with(configs, runs.clone());

    let outcome = engine
        .start_run("cfg-1", "owner-1", settings(25, 10))
        .await
        .unwrap();

    assert_eq!(outcome.records_generated, 25);
    assert_eq!(runs.checkpoints(), vec![10, 20, 25]);

    let run = runs.single_run();
    assert_eq!(run.id, outcome.run_id);
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.records_count, 25);
    assert!(run.end_time.is_some());
}

#[tokio::test]
async fn test_exact_multiple_of_batch_size() {
    let configs = Arc::new(InMemoryConfigRepository::with_config(sample_config(
        "cfg-1", "owner-1",
    )));
    let runs = Arc::new(InMemoryRunRepository::new());
    let engine = engine_with(configs, runs.clone());

    let outcome = engine
        .start_run("cfg-1", "owner-1", settings(30, 10))
        .await
        .unwrap();

    // ceil(30/10) = 3 checkpoints, last one at exactly the total
    assert_eq!(outcome.records_generated, 30);
    assert_eq!(runs.checkpoints(), vec![10, 20, 30]);
    assert_eq!(runs.single_run().status, RunStatus::Completed);
}

#[tokio::test]
async fn test_oversized_batch_truncates_to_remainder() {
    let configs = Arc::new(InMemoryConfigRepository::with_config(sample_config(
        "cfg-1", "owner-1",
    )));
    let runs = Arc::new(InMemoryRunRepository::new());
    let engine = engine_with(configs, runs.clone());

    let outcome = engine
        .start_run("cfg-1", "owner-1", settings(5, 10))
        .await
        .unwrap();

    assert_eq!(outcome.records_generated, 5);
    assert_eq!(runs.checkpoints(), vec![5]);
    assert_eq!(runs.single_run().status, RunStatus::Completed);
}

#[tokio::test]
async fn test_checkpoint_fault_marks_run_failed_with_partial_count() {
    let configs = Arc::new(InMemoryConfigRepository::with_config(sample_config(
        "cfg-1", "owner-1",
    )));
    let runs = Arc::new(InMemoryRunRepository::new());
    runs.fail_on_checkpoint(2);
    let engine = engine_with(configs, runs.clone());

    let err = engine
        .start_run("cfg-1", "owner-1", settings(30, 10))
        .await
        .unwrap_err();

    match &err {
        RunError::GenerationFailed { run_id, source } => {
            let run = runs.run(run_id).expect("run should exist");
            assert_eq!(run.status, RunStatus::Failed);
            assert_eq!(run.records_count, 10);
            assert!(run.end_time.is_some());
            assert!(source.to_string().contains("injected checkpoint fault"));
        }
        other => panic!("expected GenerationFailed, got {:?}", other),
    }

    // Only the first checkpoint was durable
    assert_eq!(runs.checkpoints(), vec![10]);
}

#[tokio::test]
async fn test_failed_finalization_leaves_run_running() {
    let configs = Arc::new(InMemoryConfigRepository::with_config(sample_config(
        "cfg-1", "owner-1",
    )));
    let runs = Arc::new(InMemoryRunRepository::new());
    runs.fail_on_checkpoint(2);
    runs.fail_finalize(true);
    let engine = engine_with(configs, runs.clone());

    let err = engine
        .start_run("cfg-1", "owner-1", settings(30, 10))
        .await
        .unwrap_err();

    // The error still surfaces, but the run is stuck running with its
    // last durable checkpoint - the documented operational anomaly.
    assert!(matches!(err, RunError::GenerationFailed { .. }));
    let run = runs.single_run();
    assert_eq!(run.status, RunStatus::Running);
    assert_eq!(run.records_count, 10);
    assert!(run.end_time.is_none());
}

#[tokio::test]
async fn test_unauthorized_caller_creates_no_run() {
    let configs = Arc::new(InMemoryConfigRepository::with_config(sample_config(
        "cfg-1", "owner-1",
    )));
    let runs = Arc::new(InMemoryRunRepository::new());
    let engine = engine_with(configs, runs.clone());

    let err = engine
        .start_run("cfg-1", "intruder", settings(25, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::Unauthorized { .. }));
    assert_eq!(runs.create_calls(), 0);
    assert!(runs.checkpoints().is_empty());
}

#[tokio::test]
async fn test_missing_config_creates_no_run() {
    let configs = Arc::new(InMemoryConfigRepository::new());
    let runs = Arc::new(InMemoryRunRepository::new());
    let engine = engine_with(configs, runs.clone());

    let err = engine
        .start_run("nope", "owner-1", settings(25, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::NotFound(_)));
    assert_eq!(runs.create_calls(), 0);
}

#[tokio::test]
async fn test_invalid_settings_rejected_before_any_state() {
    let configs = Arc::new(InMemoryConfigRepository::with_config(sample_config(
        "cfg-1", "owner-1",
    )));
    let runs = Arc::new(InMemoryRunRepository::new());
    let engine = engine_with(configs.clone(), runs.clone());

    for bad in [settings(0, 10), settings(25, 0)] {
        let err = engine.start_run("cfg-1", "owner-1", bad).await.unwrap_err();
        assert!(matches!(err, RunError::InvalidSettings(_)));
    }
    assert_eq!(runs.create_calls(), 0);
}

#[tokio::test]
async fn test_completed_run_is_stable_after_return() {
    let configs = Arc::new(InMemoryConfigRepository::with_config(sample_config(
        "cfg-1", "owner-1",
    )));
    let runs = Arc::new(InMemoryRunRepository::new());
    let engine = engine_with(configs, runs.clone());

    let outcome = engine
        .start_run("cfg-1", "owner-1", settings(12, 5))
        .await
        .unwrap();

    let first_read = runs.run(&outcome.run_id).unwrap();
    let second_read = runs.run(&outcome.run_id).unwrap();
    assert_eq!(first_read.records_count, 12);
    assert_eq!(first_read.records_count, second_read.records_count);
    assert_eq!(first_read.end_time, second_read.end_time);
}

#[tokio::test]
async fn test_inter_batch_delay_is_honored() {
    let configs = Arc::new(InMemoryConfigRepository::with_config(sample_config(
        "cfg-1", "owner-1",
    )));
    let runs = Arc::new(InMemoryRunRepository::new());
    let engine = engine_with(configs, runs.clone());

    let paced = RunSettings {
        record_count: 4,
        batch_size: 2,
        delay_between_batches: 20,
    };

    let started = std::time::Instant::now();
    let outcome = engine.start_run("cfg-1", "owner-1", paced).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(outcome.records_generated, 4);
    assert_eq!(runs.checkpoints(), vec![2, 4]);
    // Two batches, a pause after each
    assert!(elapsed >= std::time::Duration::from_millis(40));
}

#[tokio::test]
async fn test_concurrent_runs_do_not_interfere() {
    let configs = Arc::new(InMemoryConfigRepository::with_config(sample_config(
        "cfg-1", "owner-1",
    )));
    let runs = Arc::new(InMemoryRunRepository::new());
    let engine = Arc::new(engine_with(configs, runs.clone()));

    let a = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.start_run("cfg-1", "owner-1", settings(20, 10)).await })
    };
    let b = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.start_run("cfg-1", "owner-1", settings(15, 5)).await })
    };

    let outcome_a = a.await.unwrap().unwrap();
    let outcome_b = b.await.unwrap().unwrap();
    assert_ne!(outcome_a.run_id, outcome_b.run_id);
    assert_eq!(outcome_a.records_generated, 20);
    assert_eq!(outcome_b.records_generated, 15);

    let run_a = runs.run(&outcome_a.run_id).unwrap();
    let run_b = runs.run(&outcome_b.run_id).unwrap();
    assert_eq!(run_a.status, RunStatus::Completed);
    assert_eq!(run_b.status, RunStatus::Completed);
    assert_eq!(run_a.records_count, 20);
    assert_eq!(run_b.records_count, 15);
}
