//! Crate-level error type for connector control operations.

use crate::config::ConfigurationError;
use crate::partition::PartitionError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectorError {
    /// Configuration could not be validated or coerced; fatal to `start`
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Task configurations could not be computed; fatal to `task_configs`
    #[error(transparent)]
    Partition(#[from] PartitionError),

    #[error("Connector has not been started")]
    NotStarted,
}

pub type Result<T> = std::result::Result<T, ConnectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_errors_keep_their_message() {
        let config_error = ConfigurationError::missing_required("redis.stream.name");
        let error: ConnectorError = config_error.clone().into();
        assert_eq!(error.to_string(), config_error.to_string());

        let partition_error = PartitionError::InvalidTaskCount { requested: 0 };
        let error: ConnectorError = partition_error.clone().into();
        assert_eq!(error.to_string(), partition_error.to_string());
    }
}
