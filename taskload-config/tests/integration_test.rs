//! Integration tests for taskload-config

use std::io::Write;
use std::time::Duration;
use taskload_config::*;
use temp_env::with_vars;

fn unset_overrides() -> Vec<(&'static str, Option<&'static str>)> {
    [
        "TASKLOAD_TARGET_HOST",
        "TASKLOAD_HTTP_TIMEOUT",
        "TASKLOAD_HEALTH_CHECK_PROBABILITY",
        "TASKLOAD_PACING_MS",
    ]
    .into_iter()
    .map(|name| (name, None))
    .collect()
}

#[test]
fn test_default_config_validation() {
    let config = TaskloadConfig::default();
    assert!(config.validate_all().is_ok());
}

#[test]
fn test_config_loader_from_env() {
    let vars = vec![
        ("TASKLOAD_TARGET_HOST", Some("http://staging.tasks:8080")),
        ("TASKLOAD_HTTP_TIMEOUT", Some("5")),
        ("TASKLOAD_HEALTH_CHECK_PROBABILITY", Some("0.25")),
        ("TASKLOAD_PACING_MS", Some("250")),
        ("TASKLOAD_LOG_LEVEL", Some("debug")),
        ("TASKLOAD_LOG_FORMAT", Some("json")),
    ];

    with_vars(vars, || {
        let loader = ConfigLoader::new();
        let config = loader.from_env().unwrap();

        assert_eq!(config.target.base_url, "http://staging.tasks:8080");
        assert_eq!(config.http.timeout, Duration::from_secs(5));
        assert_eq!(config.workload.health_check_probability, 0.25);
        assert_eq!(config.workload.pacing, Duration::from_millis(250));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
    });
}

#[test]
fn test_invalid_env_values_are_rejected() {
    with_vars(vec![("TASKLOAD_HTTP_TIMEOUT", Some("soon"))], || {
        let result = ConfigLoader::new().from_env();
        assert!(matches!(result, Err(ConfigError::EnvError(_))));
    });

    with_vars(vec![("TASKLOAD_HEALTH_CHECK_PROBABILITY", Some("3"))], || {
        let result = ConfigLoader::new().from_env();
        assert!(matches!(result, Err(ConfigError::DomainError { .. })));
    });
}

#[test]
fn test_custom_prefix() {
    with_vars(vec![("LOADGEN_TARGET_HOST", Some("https://tasks.example.com"))], || {
        let config = ConfigLoader::with_prefix("LOADGEN").from_env().unwrap();
        assert_eq!(config.target.base_url, "https://tasks.example.com");
    });
}

#[test]
fn test_yaml_config_serialization() {
    let yaml = TaskloadConfig::generate_sample();
    let parsed: TaskloadConfig = serde_yaml::from_str(&yaml).unwrap();
    assert!(parsed.validate_all().is_ok());
    assert_eq!(parsed.workload.mix, TaskloadConfig::default().workload.mix);
}

#[test]
fn test_comprehensive_config() {
    let yaml = r#"
target:
  base_url: "http://tasks.local:9090"
  tasks_path: "/api/v1/tasks"

http:
  timeout: 10
  user_agent: "perf-suite"
  verify_ssl: false

workload:
  mix:
    - operation: list
      weight: 0.5
    - operation: create
      weight: 0.3
    - operation: read_by_id
      weight: 0.2
  health_check_probability: 0.0
  pacing_ms: 500
  pool:
    seed_cap: 5
    retain_cap: 8
    delete_floor: 2

ramp:
  stages:
    - duration: 30
      target: 5
    - duration: 60
      target: 5
  tick_ms: 250

thresholds:
  max_error_rate: 0.01
  max_p95_duration_ms: 800

logging:
  level: warn
  format: compact
"#;

    let config: TaskloadConfig = serde_yaml::from_str(yaml).unwrap();
    assert!(config.validate_all().is_ok());

    assert_eq!(config.target.tasks_url(), "http://tasks.local:9090/api/v1/tasks");
    assert_eq!(config.target.health_path, "/actuator/health");
    assert_eq!(config.http.timeout, Duration::from_secs(10));
    assert!(!config.http.verify_ssl);
    assert_eq!(config.workload.mix.len(), 3);
    assert_eq!(config.workload.pacing, Duration::from_millis(500));
    assert_eq!(config.workload.pool.retain_cap, 8);
    assert_eq!(config.ramp.stages.len(), 2);
    assert_eq!(config.ramp.tick, Duration::from_millis(250));
    assert_eq!(config.ramp.total_duration(), Duration::from_secs(90));
    assert_eq!(config.thresholds.max_error_rate, 0.01);
    assert_eq!(config.thresholds.max_http_failure_rate, 0.05);
    assert_eq!(config.thresholds.max_p95_duration, Duration::from_millis(800));
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.logging.format, LogFormat::Compact);
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "target:\n  base_url: \"http://127.0.0.1:18080\"").unwrap();

    with_vars(unset_overrides(), || {
        let config = ConfigLoader::new().load(Some(file.path())).unwrap();
        assert_eq!(config.target.base_url, "http://127.0.0.1:18080");
        assert_eq!(config.workload.pool, PoolConfig::default());
    });
}

#[test]
fn test_invalid_file_mix_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "workload:\n  mix:\n    - operation: list\n      weight: 0.7"
    )
    .unwrap();

    with_vars(unset_overrides(), || {
        let result = ConfigLoader::new().from_file(file.path());
        assert!(matches!(result, Err(ConfigError::DomainError { .. })));
    });
}

#[test]
fn test_missing_file_is_read_error() {
    let result = ConfigLoader::new().from_file("/nonexistent/taskload.yaml");
    assert!(matches!(result, Err(ConfigError::FileReadError(_))));
}
