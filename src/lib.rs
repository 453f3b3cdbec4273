#![allow(clippy::doc_markdown)] // Allow technical terms like JSONMERGE, RedisJSON in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Redis Connect Core
//!
//! Configuration validation and task partitioning engine for Redis source
//! and sink connectors running inside a Kafka Connect style host.
//!
//! ## Overview
//!
//! The host hands a connector a flat map of string options. This crate
//! turns that map into a typed, internally consistent configuration,
//! reporting every problem at once when it is not, and then splits the
//! configuration into per-task configurations for parallel workers.
//!
//! ## Module Organization
//!
//! - [`config`] - Option schemas, validation, typed configurations and loading
//! - [`partition`] - Work-unit and fan-out task partitioning
//! - [`connector`] - Source and sink connector lifecycle
//! - [`error`] - Crate-level error type
//! - [`logging`] - Structured logging setup
//! - [`constants`] - Placeholder tokens and reserved option names
//!
//! ## Quick Start
//!
//! ```rust
//! use redis_connect_core::config::RawConfig;
//! use redis_connect_core::connector::{Connector, RedisSourceConnector};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut raw = RawConfig::new();
//! raw.insert("redis.reader".to_string(), "KEYS".to_string());
//! raw.insert("redis.keys.patterns".to_string(), "user:*,order:*,cart:*".to_string());
//!
//! let mut connector = RedisSourceConnector::new();
//! connector.start(raw)?;
//!
//! let tasks = connector.task_configs(2)?;
//! assert_eq!(tasks[0]["redis.keys.patterns"], "user:*,order:*");
//! assert_eq!(tasks[1]["redis.keys.patterns"], "cart:*");
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests, including property tests
//! ```

pub mod config;
pub mod connector;
pub mod constants;
pub mod error;
pub mod logging;
pub mod partition;

pub use config::{
    ConfigResult, ConfigurationError, ConnectorConfig, ConnectorKind, OptionSchema, RawConfig,
    SinkConfig, SourceConfig, ValidationResult,
};
pub use connector::{Connector, RedisSinkConnector, RedisSourceConnector};
pub use error::{ConnectorError, Result};
pub use partition::{PartitionError, PartitionMode};
