//! Redis sink connector control plane.
//!
//! Sink tasks consume whatever topic partitions the host assigns them, so
//! every task receives the same configuration tagged with its index.

use super::{log_rejected, Connector};
use crate::config::{ConnectorKind, RawConfig, SinkConfig};
use crate::error::{ConnectorError, Result};
use crate::logging::log_connector_operation;
use crate::partition;
use tracing::info;

#[derive(Debug, Clone)]
struct Started {
    props: RawConfig,
    config: SinkConfig,
}

#[derive(Debug, Clone, Default)]
pub struct RedisSinkConnector {
    started: Option<Started>,
}

impl RedisSinkConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&SinkConfig> {
        self.started.as_ref().map(|started| &started.config)
    }
}

impl Connector for RedisSinkConnector {
    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Sink
    }

    fn start(&mut self, raw: RawConfig) -> Result<()> {
        let config = SinkConfig::from_raw(&raw).map_err(|error| {
            log_rejected(self.kind(), &error);
            error
        })?;

        info!(
            command = %config.command(),
            keyspace = %config.keyspace(),
            multiexec = config.is_multiexec(),
            wait_replicas = config.wait_replicas(),
            "Started Redis sink connector"
        );
        log_connector_operation("start", "sink", "started", None);

        self.started = Some(Started { props: raw, config });
        Ok(())
    }

    fn task_configs(&self, max_tasks: usize) -> Result<Vec<RawConfig>> {
        let started = self.started.as_ref().ok_or(ConnectorError::NotStarted)?;
        Ok(partition::fan_out(&started.props, max_tasks)?)
    }

    fn stop(&mut self) {
        if self.started.take().is_some() {
            log_connector_operation("stop", "sink", "stopped", None);
        }
    }

    fn is_started(&self) -> bool {
        self.started.is_some()
    }
}
