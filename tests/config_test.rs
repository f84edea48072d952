//! Tests for configuration parsing and validation

use prometheus_task_scheduler::config::scheduler::{
    ENV_DEFAULT_PRIORITY, ENV_STACK_SIZE, ENV_THREAD_PREFIX, ENV_WORKER_COUNT,
};
use prometheus_task_scheduler::util::Priority;
use prometheus_task_scheduler::SchedulerConfig;

#[test]
fn test_scheduler_config_from_json() {
    let json = r#"{
        "worker_count": 6,
        "thread_name_prefix": "inference",
        "thread_stack_size": 4194304,
        "default_priority": "high"
    }"#;

    let config = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(config.worker_count, 6);
    assert_eq!(config.thread_name_prefix, "inference");
    assert_eq!(config.thread_stack_size, Some(4 * 1024 * 1024));
    assert_eq!(config.default_priority, Priority::High);
}

#[test]
fn test_scheduler_config_partial_json_uses_defaults() {
    let config = SchedulerConfig::from_json_str(r#"{ "worker_count": 2 }"#).unwrap();
    let defaults = SchedulerConfig::default();
    assert_eq!(config.worker_count, 2);
    assert_eq!(config.thread_name_prefix, defaults.thread_name_prefix);
    assert_eq!(config.thread_stack_size, None);
    assert_eq!(config.default_priority, Priority::Medium);
}

#[test]
fn test_scheduler_config_zero_workers_rejected() {
    let err = SchedulerConfig::from_json_str(r#"{ "worker_count": 0 }"#).unwrap_err();
    assert_eq!(err, "worker_count must be greater than 0");
}

#[test]
fn test_scheduler_config_bad_json() {
    let err = SchedulerConfig::from_json_str(r#"{ "default_priority": "urgent" }"#).unwrap_err();
    assert!(err.starts_with("parse error"), "{err}");
}

#[test]
fn test_scheduler_config_round_trips_through_json() {
    let config = SchedulerConfig::new()
        .with_worker_count(5)
        .with_default_priority(Priority::Critical);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(SchedulerConfig::from_json_str(&json).unwrap(), config);
}

// The only test in this binary that touches the process environment.
#[test]
fn test_scheduler_config_from_env() {
    std::env::set_var(ENV_WORKER_COUNT, "3");
    std::env::set_var(ENV_THREAD_PREFIX, "env-worker");
    std::env::set_var(ENV_STACK_SIZE, "1048576");
    std::env::set_var(ENV_DEFAULT_PRIORITY, "low");

    let config = SchedulerConfig::from_env().unwrap();
    assert_eq!(config.worker_count, 3);
    assert_eq!(config.thread_name_prefix, "env-worker");
    assert_eq!(config.thread_stack_size, Some(1_048_576));
    assert_eq!(config.default_priority, Priority::Low);

    std::env::set_var(ENV_WORKER_COUNT, "many");
    let err = SchedulerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains(ENV_WORKER_COUNT), "{err}");

    std::env::set_var(ENV_WORKER_COUNT, "0");
    assert!(SchedulerConfig::from_env().is_err());

    for var in [ENV_WORKER_COUNT, ENV_THREAD_PREFIX, ENV_STACK_SIZE, ENV_DEFAULT_PRIORITY] {
        std::env::remove_var(var);
    }
}
