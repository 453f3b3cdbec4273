//! End-to-end validation scenarios for the sink connector configuration.

use redis_connect_core::config::sink::{
    self, RedisCommand, SinkConfig, CHARSET_CONFIG, COMMAND_CONFIG, FIXED_JSON_PATH_CONFIG,
    JSON_PATH_CONFIG, MULTIEXEC_CONFIG, PUSH_DIRECTION_CONFIG, WAIT_REPLICAS_CONFIG,
    WAIT_TIMEOUT_CONFIG,
};
use redis_connect_core::config::{ConfigurationError, RawConfig};
use std::time::Duration;

fn raw(pairs: &[(&str, &str)]) -> RawConfig {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn error_options(config: &RawConfig) -> Vec<String> {
    sink::validator()
        .unwrap()
        .validate_all(config)
        .values()
        .iter()
        .filter(|value| !value.errors.is_empty())
        .map(|value| value.name.clone())
        .collect()
}

#[test]
fn test_defaults_are_valid() {
    let result = sink::validator().unwrap().validate_all(&RawConfig::new());

    assert!(!result.has_errors(), "unexpected errors: {:?}", result.error_messages());
    assert_eq!(result.string(COMMAND_CONFIG), Some("XADD"));
}

#[test]
fn test_per_field_errors_skip_cross_field_rules() {
    let config = raw(&[
        (WAIT_REPLICAS_CONFIG, "abc"),
        (COMMAND_CONFIG, "SET"),
        (MULTIEXEC_CONFIG, "true"),
        (JSON_PATH_CONFIG, "$.a"),
    ]);

    let result = sink::validator().unwrap().validate_all(&config);

    assert_eq!(result.error_count(), 1);
    let errors = result.errors_for(WAIT_REPLICAS_CONFIG);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("abc"));
    assert!(result.errors_for(MULTIEXEC_CONFIG).is_empty());
}

#[test]
fn test_multiexec_with_unsupported_command() {
    let config = raw(&[(COMMAND_CONFIG, "HSET"), (MULTIEXEC_CONFIG, "true")]);
    let result = sink::validator().unwrap().validate_all(&config);

    assert_eq!(result.error_count(), 1);
    assert_eq!(
        result.errors_for(MULTIEXEC_CONFIG),
        ["Invalid configuration redis.multiexec: multi/exec is only supported with these data structures: XADD, LPUSH, RPUSH, SADD, ZADD"]
    );
}

#[test]
fn test_multiexec_with_every_supported_command() {
    for command in RedisCommand::multiexec_commands() {
        let config = raw(&[(COMMAND_CONFIG, command.name()), (MULTIEXEC_CONFIG, "TRUE")]);
        assert!(error_options(&config).is_empty(), "{command} should allow multi/exec");
    }
}

#[test]
fn test_json_paths_require_jsonmerge() {
    let config = raw(&[
        (COMMAND_CONFIG, "JSONSET"),
        (JSON_PATH_CONFIG, "$.a"),
        (FIXED_JSON_PATH_CONFIG, "$.b"),
    ]);
    assert_eq!(
        error_options(&config),
        vec![JSON_PATH_CONFIG.to_string(), FIXED_JSON_PATH_CONFIG.to_string()]
    );

    let merge = raw(&[
        (COMMAND_CONFIG, "JSONMERGE"),
        (JSON_PATH_CONFIG, "$.a"),
        (FIXED_JSON_PATH_CONFIG, "$.b"),
    ]);
    assert!(error_options(&merge).is_empty());
}

#[test]
fn test_every_cross_field_rule_reports() {
    let config = raw(&[
        (COMMAND_CONFIG, "SET"),
        (MULTIEXEC_CONFIG, "true"),
        (JSON_PATH_CONFIG, "$.a"),
        (CHARSET_CONFIG, "not-a-charset"),
    ]);

    let result = sink::validator().unwrap().validate_all(&config);
    assert_eq!(result.error_count(), 3);
}

#[test]
fn test_charset_resolution() {
    let result = sink::validator()
        .unwrap()
        .validate_all(&raw(&[(CHARSET_CONFIG, "not-a-charset")]));
    let errors = result.errors_for(CHARSET_CONFIG);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("not-a-charset"));

    assert!(error_options(&raw(&[(CHARSET_CONFIG, "UTF-8")])).is_empty());
    assert!(error_options(&raw(&[(CHARSET_CONFIG, " utf8 ")])).is_empty());
}

#[test]
fn test_validation_is_deterministic() {
    let config = raw(&[
        (COMMAND_CONFIG, "TSADD"),
        (MULTIEXEC_CONFIG, "true"),
        (FIXED_JSON_PATH_CONFIG, "$.x"),
    ]);
    let validator = sink::validator().unwrap();

    let first = validator.validate_all(&config);
    let second = validator.validate_all(&config);
    assert_eq!(first, second);
    assert_eq!(first.error_messages(), second.error_messages());
}

#[test]
fn test_wait_for_replication_directive() {
    let disabled = SinkConfig::from_raw(&raw(&[(WAIT_REPLICAS_CONFIG, "0")])).unwrap();
    assert_eq!(disabled.wait_for_replication(), None);

    let enabled = SinkConfig::from_raw(&raw(&[
        (WAIT_REPLICAS_CONFIG, "2"),
        (WAIT_TIMEOUT_CONFIG, "500"),
    ]))
    .unwrap();
    let directive = enabled.wait_for_replication().unwrap();
    assert_eq!(directive.replicas, 2);
    assert_eq!(directive.timeout, Duration::from_millis(500));
    assert_eq!(enabled.writer_options().wait_for_replication, Some(directive));
}

#[test]
fn test_typed_config_requires_valid_raw_map() {
    let config = raw(&[(COMMAND_CONFIG, "HSET"), (MULTIEXEC_CONFIG, "true")]);

    let error = SinkConfig::from_raw(&config).unwrap_err();

    assert!(matches!(
        error,
        ConfigurationError::ValidationFailed { ref errors }
            if errors.len() == 1 && errors[0].starts_with(MULTIEXEC_CONFIG)
    ));
}

#[test]
fn test_cross_field_errors_are_constraint_errors() {
    let config = raw(&[(COMMAND_CONFIG, "SET"), (FIXED_JSON_PATH_CONFIG, "$.b")]);
    let result = sink::validator().unwrap().validate_all(&config);

    let expected = ConfigurationError::constraint(
        FIXED_JSON_PATH_CONFIG,
        "The fixed JSON path configuration is not allowed unless the command is JSONMERGE.",
    );
    assert_eq!(result.errors_for(FIXED_JSON_PATH_CONFIG), [expected.to_string()]);
}

#[test]
fn test_bad_push_direction_caught_when_typed() {
    let config = raw(&[(PUSH_DIRECTION_CONFIG, "UP")]);

    assert!(error_options(&config).is_empty());
    let error = SinkConfig::from_raw(&config).unwrap_err();
    assert!(matches!(error, ConfigurationError::Parse { ref option, .. } if option == PUSH_DIRECTION_CONFIG));
}
