//! Connector start / task_configs / stop as a host would drive them.

use redis_connect_core::config::source::{KEY_PATTERNS_CONFIG, READER_CONFIG, STREAM_NAME_CONFIG};
use redis_connect_core::config::{ConnectorKind, RawConfig};
use redis_connect_core::connector::{Connector, RedisSinkConnector, RedisSourceConnector};
use redis_connect_core::constants::TASK_ID_CONFIG;
use redis_connect_core::{ConfigurationError, ConnectorError, PartitionError};

fn raw(pairs: &[(&str, &str)]) -> RawConfig {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn connectors() -> Vec<Box<dyn Connector>> {
    vec![
        Box::new(RedisSourceConnector::new()),
        Box::new(RedisSinkConnector::new()),
    ]
}

#[test]
fn test_keys_reader_groups_patterns() {
    let mut connector = RedisSourceConnector::new();
    connector
        .start(raw(&[
            (READER_CONFIG, "KEYS"),
            (KEY_PATTERNS_CONFIG, "k1, k2,k3 ,k4,k5"),
            ("topic", "keys-topic"),
        ]))
        .unwrap();

    let tasks = connector.task_configs(2).unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0][KEY_PATTERNS_CONFIG], "k1,k2,k3");
    assert_eq!(tasks[1][KEY_PATTERNS_CONFIG], "k4,k5");
    assert!(tasks.iter().all(|t| t["topic"] == "keys-topic"));
    assert!(tasks.iter().all(|t| !t.contains_key(TASK_ID_CONFIG)));
}

#[test]
fn test_keys_reader_never_exceeds_pattern_count() {
    let mut connector = RedisSourceConnector::new();
    connector
        .start(raw(&[(READER_CONFIG, "KEYS"), (KEY_PATTERNS_CONFIG, "a,b,a")]))
        .unwrap();

    // repeated patterns are collapsed when the config is typed
    let tasks = connector.task_configs(8).unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0][KEY_PATTERNS_CONFIG], "a");
    assert_eq!(tasks[1][KEY_PATTERNS_CONFIG], "b");
}

#[test]
fn test_stream_reader_fans_out_identically() {
    let mut connector = RedisSourceConnector::new();
    let props = raw(&[(STREAM_NAME_CONFIG, "events")]);
    connector.start(props.clone()).unwrap();

    let tasks = connector.task_configs(3).unwrap();

    assert_eq!(tasks.len(), 3);
    for (index, task) in tasks.iter().enumerate() {
        assert_eq!(task[TASK_ID_CONFIG], index.to_string());
        let mut rest = task.clone();
        rest.remove(TASK_ID_CONFIG);
        assert_eq!(rest, props);
    }
}

#[test]
fn test_every_connector_requires_start() {
    for connector in connectors() {
        assert_eq!(connector.task_configs(1), Err(ConnectorError::NotStarted));
        assert!(!connector.is_started());
    }
}

#[test]
fn test_every_connector_rejects_zero_tasks() {
    for mut connector in connectors() {
        let props = match connector.kind() {
            ConnectorKind::Source => raw(&[(STREAM_NAME_CONFIG, "events")]),
            ConnectorKind::Sink => RawConfig::new(),
        };
        connector.start(props).unwrap();

        assert_eq!(
            connector.task_configs(0),
            Err(ConnectorError::Partition(PartitionError::InvalidTaskCount {
                requested: 0
            }))
        );
    }
}

#[test]
fn test_restart_replaces_configuration() {
    let mut connector = RedisSourceConnector::new();
    connector.start(raw(&[(STREAM_NAME_CONFIG, "first")])).unwrap();
    connector.stop();
    connector.start(raw(&[(STREAM_NAME_CONFIG, "second")])).unwrap();

    let tasks = connector.task_configs(1).unwrap();
    assert_eq!(tasks[0][STREAM_NAME_CONFIG], "second");
}

#[test]
fn test_failed_start_keeps_previous_state() {
    let mut connector = RedisSinkConnector::new();
    connector.start(RawConfig::new()).unwrap();

    let error = connector
        .start(raw(&[("redis.pool", "zero")]))
        .unwrap_err();

    assert!(matches!(
        error,
        ConnectorError::Configuration(ConfigurationError::ValidationFailed { ref errors }) if errors.len() == 1
    ));
    assert!(connector.is_started());
}
