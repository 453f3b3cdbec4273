//! # Option Schema
//!
//! Declares the set of options a connector recognizes: name, type, default,
//! importance, documentation and an optional per-option validator.
//!
//! Schemas are plain ordered lists of [`OptionSpec`] values. Composition is
//! done by concatenating lists, so the shared connection options can be
//! prepended to either the source or the sink options:
//!
//! ```rust
//! use redis_connect_core::config::schema::{Importance, OptionKind, OptionSchema, OptionSpec};
//! use redis_connect_core::config::RawConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = OptionSchema::new(vec![
//!     OptionSpec::new("redis.separator", OptionKind::String, ":", Importance::Medium, "Key separator"),
//! ])?;
//!
//! let raw = RawConfig::new();
//! assert_eq!(schema.resolve(&raw, "redis.separator").as_deref(), Some(":"));
//! # Ok(())
//! # }
//! ```

use super::error::{ConfigResult, ConfigurationError};
use super::RawConfig;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Declared type of an option value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionKind {
    String,
    Boolean,
    Int,
    Long,
}

impl OptionKind {
    /// Coerce a raw string into a value of this kind
    ///
    /// Surrounding whitespace is ignored for every kind.
    pub fn parse(&self, raw: &str) -> Result<OptionValue, String> {
        let trimmed = raw.trim();
        match self {
            Self::String => Ok(OptionValue::String(trimmed.to_string())),
            Self::Boolean => {
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(OptionValue::Boolean(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(OptionValue::Boolean(false))
                } else {
                    Err("Expected value to be either true or false".to_string())
                }
            }
            Self::Int => trimmed
                .parse::<i32>()
                .map(OptionValue::Int)
                .map_err(|_| "Not a number of type INT".to_string()),
            Self::Long => trimmed
                .parse::<i64>()
                .map(OptionValue::Long)
                .map_err(|_| "Not a number of type LONG".to_string()),
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "STRING"),
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::Int => write!(f, "INT"),
            Self::Long => write!(f, "LONG"),
        }
    }
}

/// How prominently an option is documented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Importance {
    High,
    Medium,
    Low,
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Low => write!(f, "LOW"),
        }
    }
}

/// A coerced option value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    String(String),
    Boolean(bool),
    Int(i32),
    Long(i64),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view of `Int` and `Long` values
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(i64::from(*i)),
            Self::Long(l) => Some(*l),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Long(l) => write!(f, "{l}"),
        }
    }
}

/// Per-option check applied after type coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OptionValidator {
    /// Value must exactly match one of the listed names
    OneOf(&'static [&'static str]),
    /// Numeric value must be greater than or equal to the bound
    AtLeast(i64),
    /// String value must not be empty
    NonBlank,
}

impl OptionValidator {
    pub fn check(&self, value: &OptionValue) -> Result<(), String> {
        match (self, value) {
            (Self::OneOf(allowed), OptionValue::String(s)) => {
                if allowed.contains(&s.as_str()) {
                    Ok(())
                } else {
                    Err(format!("String must be one of: {}", allowed.join(", ")))
                }
            }
            (Self::AtLeast(min), value) => match value.as_i64() {
                Some(n) if n >= *min => Ok(()),
                Some(_) => Err(format!("Value must be at least {min}")),
                None => Err("Value must be a number".to_string()),
            },
            (Self::NonBlank, OptionValue::String(s)) => {
                if s.is_empty() {
                    Err("String must be non-empty".to_string())
                } else {
                    Ok(())
                }
            }
            (_, _) => Err("Value must be a string".to_string()),
        }
    }

    /// Short human-readable form used in the option table
    pub fn describe(&self) -> String {
        match self {
            Self::OneOf(allowed) => format!("one of {}", allowed.join(", ")),
            Self::AtLeast(min) => format!("[{min},...]"),
            Self::NonBlank => "non-empty string".to_string(),
        }
    }
}

/// Declaration of a single configuration option
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSpec {
    pub name: String,
    pub kind: OptionKind,
    /// `None` marks the option as required
    pub default: Option<String>,
    pub importance: Importance,
    pub doc: String,
    pub validator: Option<OptionValidator>,
}

impl OptionSpec {
    /// Declare an option with a default value
    pub fn new(
        name: impl Into<String>,
        kind: OptionKind,
        default: impl Into<String>,
        importance: Importance,
        doc: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            default: Some(default.into()),
            importance,
            doc: doc.into(),
            validator: None,
        }
    }

    /// Declare an option that has no default and must be supplied
    pub fn required(
        name: impl Into<String>,
        kind: OptionKind,
        importance: Importance,
        doc: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            importance,
            doc: doc.into(),
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: OptionValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Coerce a raw value and run the option's validator on it
    pub fn parse_value(&self, raw: &str) -> Result<OptionValue, String> {
        let value = self.kind.parse(raw)?;
        if let Some(validator) = &self.validator {
            validator.check(&value)?;
        }
        Ok(value)
    }
}

/// Treatment of raw keys that no option declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Unknown keys are ignored
    #[default]
    Lenient,
    /// Unknown keys are reported as errors
    Strict,
}

/// Ordered, immutable registry of option declarations
#[derive(Debug, Clone)]
pub struct OptionSchema {
    options: Vec<OptionSpec>,
    strictness: Strictness,
}

impl OptionSchema {
    /// Build a lenient schema, rejecting duplicate option names
    pub fn new(options: Vec<OptionSpec>) -> ConfigResult<Self> {
        let mut seen = HashSet::with_capacity(options.len());
        for spec in &options {
            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigurationError::duplicate_option(&spec.name));
            }
        }

        Ok(Self {
            options,
            strictness: Strictness::Lenient,
        })
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Options in declaration order
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|spec| spec.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Raw keys that no option in this schema declares, sorted by name
    pub fn unknown_keys<'a>(&self, raw: &'a RawConfig) -> Vec<&'a str> {
        let mut unknown: Vec<&str> = raw
            .keys()
            .map(String::as_str)
            .filter(|key| !self.contains(key))
            .collect();
        unknown.sort_unstable();
        unknown
    }

    /// Raw string for `name`, falling back to the declared default
    ///
    /// No coercion happens here. Returns `None` for undeclared names and for
    /// required options that were not supplied.
    pub fn resolve(&self, raw: &RawConfig, name: &str) -> Option<String> {
        let spec = self.get(name)?;
        raw.get(name).cloned().or_else(|| spec.default.clone())
    }

    /// Coerce every option, failing on the first value that cannot be used
    pub fn parse(&self, raw: &RawConfig) -> ConfigResult<ParsedConfig> {
        if self.strictness == Strictness::Strict {
            if let Some(key) = self.unknown_keys(raw).first() {
                return Err(ConfigurationError::unknown_option(*key));
            }
        }

        let mut values = HashMap::with_capacity(self.options.len());
        for spec in &self.options {
            let raw_value = self
                .resolve(raw, &spec.name)
                .ok_or_else(|| ConfigurationError::missing_required(&spec.name))?;
            let value = spec
                .parse_value(&raw_value)
                .map_err(|reason| ConfigurationError::parse(&spec.name, &raw_value, reason))?;
            values.insert(spec.name.clone(), value);
        }

        Ok(ParsedConfig { values })
    }

    /// Markdown table documenting every option for operators
    pub fn documentation_table(&self) -> String {
        let mut table = String::from("| Name | Type | Default | Valid Values | Importance | Description |\n");
        table.push_str("|------|------|---------|--------------|------------|-------------|\n");
        for spec in &self.options {
            let default = spec.default.as_deref().unwrap_or("(required)");
            let valid = spec
                .validator
                .map(|validator| validator.describe())
                .unwrap_or_default();
            table.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                spec.name,
                spec.kind,
                default,
                valid,
                spec.importance,
                spec.doc.replace('\n', " ")
            ));
        }
        table
    }
}

/// Fully coerced option values, keyed by option name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfig {
    values: HashMap<String, OptionValue>,
}

impl ParsedConfig {
    pub fn get_string(&self, name: &str) -> ConfigResult<&str> {
        self.typed(name, "STRING", OptionValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> ConfigResult<bool> {
        self.typed(name, "BOOLEAN", OptionValue::as_bool)
    }

    pub fn get_int(&self, name: &str) -> ConfigResult<i32> {
        self.typed(name, "INT", |value| match value {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        })
    }

    pub fn get_long(&self, name: &str) -> ConfigResult<i64> {
        self.typed(name, "LONG", |value| match value {
            OptionValue::Long(l) => Some(*l),
            _ => None,
        })
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        expected: &str,
        extract: impl FnOnce(&'a OptionValue) -> Option<T>,
    ) -> ConfigResult<T> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| ConfigurationError::unknown_option(name))?;
        extract(value).ok_or_else(|| {
            ConfigurationError::parse(name, value.to_string(), format!("Expected a value of type {expected}"))
        })
    }
}
