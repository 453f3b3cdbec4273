//! # Connector Constants
//!
//! Placeholder tokens and reserved option names shared by the configuration
//! and partitioning modules.

/// Replaced with the originating topic name in the sink key space template
pub const TOKEN_TOPIC: &str = "${topic}";

/// Replaced with the task id in the stream consumer name template
pub const TOKEN_TASK: &str = "${task}";

/// Replaced with the originating stream name in the source topic template
pub const TOKEN_STREAM: &str = "${stream}";

/// Option added to fanned-out task configurations, holding the task index
pub const TASK_ID_CONFIG: &str = "task.id";

/// Delimiter used to join work units into a single option value
pub const WORK_UNIT_SEPARATOR: &str = ",";
