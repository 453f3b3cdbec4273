//! Configuration Error Types
//!
//! Errors raised while declaring, loading, validating and coercing connector
//! configuration. Parse and constraint failures carry the option name so an
//! operator knows which property to fix.

use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A supplied value cannot be coerced to the option's declared type
    #[error("Invalid value {value} for configuration {option}: {reason}")]
    Parse {
        option: String,
        value: String,
        reason: String,
    },

    /// A well-typed combination of options is nonetheless forbidden
    #[error("Invalid configuration {option}: {reason}")]
    Constraint { option: String, reason: String },

    /// Required option without a default was not supplied
    #[error("Missing required configuration \"{option}\" which has no default value.")]
    MissingRequired { option: String },

    /// Option registered twice in the same schema
    #[error("Configuration option {option} is defined twice.")]
    DuplicateOption { option: String },

    /// Option looked up by name is not part of the schema
    #[error("Unknown configuration option: {option}")]
    UnknownOption { option: String },

    /// Validation collected one or more errors; every message is kept
    #[error("Configuration validation failed with {} error(s): {}", errors.len(), errors.join("; "))]
    ValidationFailed { errors: Vec<String> },

    /// Raw configuration could not be loaded from its sources
    #[error("Failed to load configuration from {source_name}: {error}")]
    Load { source_name: String, error: String },
}

impl ConfigurationError {
    /// Create a parse error
    pub fn parse<O: Into<String>, V: Into<String>, R: Into<String>>(
        option: O,
        value: V,
        reason: R,
    ) -> Self {
        Self::Parse {
            option: option.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a constraint error
    pub fn constraint<O: Into<String>, R: Into<String>>(option: O, reason: R) -> Self {
        Self::Constraint {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing required option error
    pub fn missing_required<O: Into<String>>(option: O) -> Self {
        Self::MissingRequired {
            option: option.into(),
        }
    }

    /// Create a duplicate option error
    pub fn duplicate_option<O: Into<String>>(option: O) -> Self {
        Self::DuplicateOption {
            option: option.into(),
        }
    }

    /// Create an unknown option error
    pub fn unknown_option<O: Into<String>>(option: O) -> Self {
        Self::UnknownOption {
            option: option.into(),
        }
    }

    /// Create a validation failure carrying every collected message
    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::ValidationFailed { errors }
    }

    /// Create a load error
    pub fn load<S: Into<String>, E: std::fmt::Display>(source_name: S, error: E) -> Self {
        Self::Load {
            source_name: source_name.into(),
            error: error.to_string(),
        }
    }

    /// Name of the option this error is attached to, if any
    pub fn option(&self) -> Option<&str> {
        match self {
            Self::Parse { option, .. }
            | Self::Constraint { option, .. }
            | Self::MissingRequired { option }
            | Self::DuplicateOption { option }
            | Self::UnknownOption { option } => Some(option),
            Self::ValidationFailed { .. } | Self::Load { .. } => None,
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigurationError>;
