//! # Task Partitioner
//!
//! Splits one connector configuration into per-task configurations.
//!
//! Two modes are supported:
//!
//! - **Work units** ([`partition_by_work_units`]): the units listed in one
//!   option are divided into `min(units, max_tasks)` contiguous, balanced
//!   groups, and each task receives the base configuration with that option
//!   replaced by its own comma-joined group.
//! - **Fan out** ([`fan_out`]): exactly `max_tasks` copies of the base
//!   configuration, each carrying its index in `task.id`.
//!
//! The base configuration is never mutated, and the output is deterministic
//! for identical inputs.

use crate::config::RawConfig;
use crate::constants::{TASK_ID_CONFIG, WORK_UNIT_SEPARATOR};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("Maximum task count must be at least 1, got {requested}")]
    InvalidTaskCount { requested: usize },

    #[error("No work units configured in {option}")]
    EmptyWorkUnits { option: String },

    #[error("Work unit {unit} is listed more than once")]
    DuplicateWorkUnit { unit: String },

    #[error("Work unit {unit} contains the separator \"{separator}\"")]
    InvalidWorkUnit { unit: String, separator: &'static str },
}

pub type PartitionResult<T> = Result<T, PartitionError>;

/// How a connector's configuration is divided among tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionMode {
    /// Divide `units` among tasks, writing each group into `option`
    WorkUnits { option: String, units: Vec<String> },
    /// Identical copies distinguished only by `task.id`
    FanOut,
}

impl PartitionMode {
    pub fn work_units(option: impl Into<String>, units: Vec<String>) -> Self {
        Self::WorkUnits {
            option: option.into(),
            units,
        }
    }
}

/// Compute per-task configurations for `base` using `mode`
pub fn task_configs(
    base: &RawConfig,
    mode: &PartitionMode,
    max_tasks: usize,
) -> PartitionResult<Vec<RawConfig>> {
    match mode {
        PartitionMode::WorkUnits { option, units } => {
            partition_by_work_units(base, option, units, max_tasks)
        }
        PartitionMode::FanOut => fan_out(base, max_tasks),
    }
}

/// Split `items` into `groups` contiguous, order-preserving groups
///
/// Group sizes differ by at most one and the larger groups come first, so
/// five items in two groups become `[a, b, c]` and `[d, e]`. When there are
/// fewer items than groups the trailing groups are empty.
pub fn group_partitions<T: Clone>(items: &[T], groups: usize) -> PartitionResult<Vec<Vec<T>>> {
    if groups == 0 {
        return Err(PartitionError::InvalidTaskCount { requested: groups });
    }

    let base_size = items.len() / groups;
    let remainder = items.len() % groups;

    let mut rest = items;
    let mut result = Vec::with_capacity(groups);
    for index in 0..groups {
        let size = base_size + usize::from(index < remainder);
        let (group, tail) = rest.split_at(size);
        result.push(group.to_vec());
        rest = tail;
    }

    Ok(result)
}

/// Work-unit partitioning: one task per non-empty group of `units`
pub fn partition_by_work_units(
    base: &RawConfig,
    option: &str,
    units: &[String],
    max_tasks: usize,
) -> PartitionResult<Vec<RawConfig>> {
    if max_tasks == 0 {
        return Err(PartitionError::InvalidTaskCount { requested: max_tasks });
    }
    if units.is_empty() {
        return Err(PartitionError::EmptyWorkUnits {
            option: option.to_string(),
        });
    }

    // Each group is joined with the separator, so a unit containing it would
    // read back as several units.
    if let Some(unit) = units.iter().find(|unit| unit.contains(WORK_UNIT_SEPARATOR)) {
        return Err(PartitionError::InvalidWorkUnit {
            unit: unit.clone(),
            separator: WORK_UNIT_SEPARATOR,
        });
    }

    let mut seen = HashSet::with_capacity(units.len());
    if let Some(unit) = units.iter().find(|unit| !seen.insert(unit.as_str())) {
        return Err(PartitionError::DuplicateWorkUnit { unit: unit.clone() });
    }

    let task_count = units.len().min(max_tasks);
    let groups = group_partitions(units, task_count)?;

    debug!(
        option = %option,
        work_units = units.len(),
        max_tasks = max_tasks,
        task_count = task_count,
        "Partitioned work units across tasks"
    );

    Ok(groups
        .into_iter()
        .map(|group| {
            let mut config = base.clone();
            config.insert(option.to_string(), group.join(WORK_UNIT_SEPARATOR));
            config
        })
        .collect())
}

/// Fan-out partitioning: `max_tasks` copies of `base` with `task.id` set
pub fn fan_out(base: &RawConfig, max_tasks: usize) -> PartitionResult<Vec<RawConfig>> {
    if max_tasks == 0 {
        return Err(PartitionError::InvalidTaskCount { requested: max_tasks });
    }

    debug!(task_count = max_tasks, "Fanned out configuration across tasks");

    Ok((0..max_tasks)
        .map(|task_id| {
            let mut config = base.clone();
            config.insert(TASK_ID_CONFIG.to_string(), task_id.to_string());
            config
        })
        .collect())
}
