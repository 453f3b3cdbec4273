//! # Connector Lifecycle
//!
//! The control-plane surface a connector host drives: `start` with a raw
//! property map, `task_configs` to split the work, `stop` to release it.
//!
//! [`RedisSourceConnector`] and [`RedisSinkConnector`] validate their raw
//! configuration on `start`, keep both the raw map and the typed view, and
//! delegate task splitting to [`crate::partition`].

pub mod sink;
pub mod source;

pub use sink::RedisSinkConnector;
pub use source::RedisSourceConnector;

use crate::config::{
    ConfigResult, ConfigurationError, ConnectorKind, OptionSchema, RawConfig, ValidationResult,
};
use crate::error::Result;
use crate::logging::log_connector_operation;
use tracing::warn;

/// Control-plane operations shared by the source and sink connectors
pub trait Connector {
    fn kind(&self) -> ConnectorKind;

    /// Validate `raw` and retain it for [`Connector::task_configs`]
    ///
    /// Starting an already started connector replaces its configuration.
    fn start(&mut self, raw: RawConfig) -> Result<()>;

    /// Per-task configurations for at most `max_tasks` tasks
    fn task_configs(&self, max_tasks: usize) -> Result<Vec<RawConfig>>;

    /// Release the retained configuration
    fn stop(&mut self);

    fn is_started(&self) -> bool;

    fn config_schema(&self) -> ConfigResult<OptionSchema> {
        self.kind().schema()
    }

    /// Run every per-field check and cross-field rule without starting
    fn validate(&self, raw: &RawConfig) -> ConfigResult<ValidationResult> {
        Ok(self.kind().validator()?.validate_all(raw))
    }
}

/// Log a configuration rejected by `start`, listing every validation error
fn log_rejected(kind: ConnectorKind, error: &ConfigurationError) {
    let errors = match error {
        ConfigurationError::ValidationFailed { errors } => errors.clone(),
        other => vec![other.to_string()],
    };
    warn!(
        connector = %kind,
        error_count = errors.len(),
        errors = ?errors,
        "Rejected connector configuration"
    );
    log_connector_operation("start", &kind.to_string(), "rejected", Some(&error.to_string()));
}
