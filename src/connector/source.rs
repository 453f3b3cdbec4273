//! Redis source connector control plane.
//!
//! With the KEYS reader, key patterns are the unit of work and are divided
//! among tasks. With the STREAM reader every task joins the same consumer
//! group, so each receives an identical configuration tagged with its index.

use super::{log_rejected, Connector};
use crate::config::source::{ReaderType, SourceConfig, KEY_PATTERNS_CONFIG};
use crate::config::{ConnectorKind, RawConfig};
use crate::error::{ConnectorError, Result};
use crate::logging::log_connector_operation;
use crate::partition::{self, PartitionMode};
use tracing::info;

#[derive(Debug, Clone)]
struct Started {
    props: RawConfig,
    config: SourceConfig,
}

#[derive(Debug, Clone, Default)]
pub struct RedisSourceConnector {
    started: Option<Started>,
}

impl RedisSourceConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed configuration, available once started
    pub fn config(&self) -> Option<&SourceConfig> {
        self.started.as_ref().map(|started| &started.config)
    }

    fn partition_mode(config: &SourceConfig) -> PartitionMode {
        match config.reader() {
            ReaderType::Keys => {
                PartitionMode::work_units(KEY_PATTERNS_CONFIG, config.key_patterns().to_vec())
            }
            ReaderType::Stream => PartitionMode::FanOut,
        }
    }
}

impl Connector for RedisSourceConnector {
    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Source
    }

    fn start(&mut self, raw: RawConfig) -> Result<()> {
        let config = SourceConfig::from_raw(&raw).map_err(|error| {
            log_rejected(self.kind(), &error);
            error
        })?;

        info!(
            reader = %config.reader(),
            key_patterns = config.key_patterns().len(),
            stream = %config.stream_name(),
            topic = %config.topic(),
            "Started Redis source connector"
        );
        log_connector_operation("start", "source", "started", None);

        self.started = Some(Started { props: raw, config });
        Ok(())
    }

    fn task_configs(&self, max_tasks: usize) -> Result<Vec<RawConfig>> {
        let started = self.started.as_ref().ok_or(ConnectorError::NotStarted)?;
        let mode = Self::partition_mode(&started.config);
        Ok(partition::task_configs(&started.props, &mode, max_tasks)?)
    }

    fn stop(&mut self) {
        if self.started.take().is_some() {
            log_connector_operation("stop", "source", "stopped", None);
        }
    }

    fn is_started(&self) -> bool {
        self.started.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::source::{READER_CONFIG, STREAM_NAME_CONFIG};
    use crate::config::ConfigurationError;
    use crate::constants::TASK_ID_CONFIG;
    use crate::partition::PartitionError;

    fn raw(pairs: &[(&str, &str)]) -> RawConfig {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_task_configs_before_start() {
        let connector = RedisSourceConnector::new();
        assert_eq!(connector.task_configs(1), Err(ConnectorError::NotStarted));
    }

    #[test]
    fn test_keys_reader_partitions_patterns() {
        let mut connector = RedisSourceConnector::new();
        connector
            .start(raw(&[
                (READER_CONFIG, "KEYS"),
                (KEY_PATTERNS_CONFIG, "k1,k2,k3,k4,k5"),
            ]))
            .unwrap();

        let configs = connector.task_configs(2).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0][KEY_PATTERNS_CONFIG], "k1,k2,k3");
        assert_eq!(configs[1][KEY_PATTERNS_CONFIG], "k4,k5");
        assert!(configs.iter().all(|c| c[READER_CONFIG] == "KEYS"));
    }

    #[test]
    fn test_stream_reader_fans_out() {
        let mut connector = RedisSourceConnector::new();
        connector.start(raw(&[(STREAM_NAME_CONFIG, "orders")])).unwrap();

        let configs = connector.task_configs(3).unwrap();
        let ids: Vec<&str> = configs.iter().map(|c| c[TASK_ID_CONFIG].as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
        assert!(configs.iter().all(|c| c[STREAM_NAME_CONFIG] == "orders"));
    }

    #[test]
    fn test_start_rejects_missing_stream_name() {
        let mut connector = RedisSourceConnector::new();
        let error = connector.start(RawConfig::new()).unwrap_err();

        assert!(matches!(
            error,
            ConnectorError::Configuration(ConfigurationError::ValidationFailed { .. })
        ));
        assert!(!connector.is_started());
    }

    #[test]
    fn test_blank_patterns_are_empty_work_units() {
        let mut connector = RedisSourceConnector::new();
        connector
            .start(raw(&[(READER_CONFIG, "KEYS"), (KEY_PATTERNS_CONFIG, " , ")]))
            .unwrap();

        assert!(matches!(
            connector.task_configs(2),
            Err(ConnectorError::Partition(PartitionError::EmptyWorkUnits { .. }))
        ));
    }

    #[test]
    fn test_stop_releases_configuration() {
        let mut connector = RedisSourceConnector::new();
        connector.start(raw(&[(STREAM_NAME_CONFIG, "orders")])).unwrap();
        assert!(connector.config().is_some());

        connector.stop();
        assert!(connector.config().is_none());
        assert_eq!(connector.task_configs(1), Err(ConnectorError::NotStarted));
    }
}
