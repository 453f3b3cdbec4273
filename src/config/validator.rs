//! # Config Validator
//!
//! Validates a raw property map against an [`OptionSchema`] and produces a
//! [`ValidationResult`] holding, per option, the coerced value and every error
//! message found for it.
//!
//! Validation runs in two stages:
//!
//! 1. **Per-field**: every declared option is resolved (raw value or default),
//!    coerced to its declared kind and checked by its own validator. Errors
//!    accumulate across options so an operator sees all of them in one pass.
//! 2. **Cross-field**: rules that relate several options to each other. These
//!    only run when the per-field stage produced no error at all, even an
//!    unrelated one, since the rules read already-coerced values.
//!
//! Cross-field errors are appended to the error list of the option they name.

use super::connection::{is_secret, MASKED_VALUE};
use super::error::{ConfigResult, ConfigurationError};
use super::schema::{OptionSchema, OptionValue, Strictness};
use super::RawConfig;
use serde::Serialize;
use tracing::debug;

/// Validation outcome for a single option
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigValue {
    pub name: String,
    /// Coerced value, absent when the option failed per-field validation
    pub value: Option<OptionValue>,
    pub errors: Vec<String>,
}

impl ConfigValue {
    fn valid(name: &str, value: OptionValue) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value),
            errors: Vec::new(),
        }
    }

    fn invalid(name: &str, error: String) -> Self {
        Self {
            name: name.to_string(),
            value: None,
            errors: vec![error],
        }
    }

    pub fn add_error_message(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Per-option validation outcomes in schema declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    values: Vec<ConfigValue>,
}

impl ValidationResult {
    pub fn values(&self) -> &[ConfigValue] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.values.iter().find(|value| value.name == name)
    }

    /// Append an error to `name`, creating an entry if the option has none
    pub fn add_error(&mut self, name: &str, message: impl Into<String>) {
        match self.values.iter_mut().find(|value| value.name == name) {
            Some(value) => value.add_error_message(message),
            None => self.values.push(ConfigValue::invalid(name, message.into())),
        }
    }

    /// Errors attached to `name`; empty for unknown names
    pub fn errors_for(&self, name: &str) -> &[String] {
        self.get(name).map(|value| value.errors.as_slice()).unwrap_or(&[])
    }

    pub fn has_errors(&self) -> bool {
        self.values.iter().any(|value| !value.is_valid())
    }

    pub fn error_count(&self) -> usize {
        self.values.iter().map(|value| value.errors.len()).sum()
    }

    /// Every error message prefixed with the option it belongs to
    pub fn error_messages(&self) -> Vec<String> {
        self.values
            .iter()
            .flat_map(|value| {
                value
                    .errors
                    .iter()
                    .map(move |error| format!("{}: {error}", value.name))
            })
            .collect()
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name)?.value.as_ref()?.as_str()
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name)?.value.as_ref()?.as_bool()
    }

    /// Copy with the coerced values of secret options masked, for display
    pub fn masked(&self) -> Self {
        let values = self
            .values
            .iter()
            .cloned()
            .map(|mut value| {
                if is_secret(&value.name) {
                    if let Some(OptionValue::String(secret)) = &mut value.value {
                        if !secret.is_empty() {
                            *secret = MASKED_VALUE.to_string();
                        }
                    }
                }
                value
            })
            .collect();
        Self { values }
    }

    /// Turn a result with errors into [`ConfigurationError::ValidationFailed`]
    pub fn ensure_valid(&self) -> ConfigResult<()> {
        if self.has_errors() {
            Err(ConfigurationError::validation_failed(self.error_messages()))
        } else {
            Ok(())
        }
    }
}

/// Rule relating several options; only invoked on a result without errors
pub type CrossFieldRule = fn(&RawConfig, &mut ValidationResult);

/// Schema plus the cross-field rules that apply to it
#[derive(Debug, Clone)]
pub struct ConfigValidator {
    schema: OptionSchema,
    rules: Vec<CrossFieldRule>,
}

impl ConfigValidator {
    pub fn new(schema: OptionSchema) -> Self {
        Self {
            schema,
            rules: Vec::new(),
        }
    }

    /// Register a cross-field rule; rules run in registration order
    pub fn with_rule(mut self, rule: CrossFieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn schema(&self) -> &OptionSchema {
        &self.schema
    }

    /// Validate every declared option, then the cross-field rules
    pub fn validate_all(&self, raw: &RawConfig) -> ValidationResult {
        let mut result = self.validate_fields(raw);

        if result.has_errors() {
            debug!(
                error_count = result.error_count(),
                "Skipping cross-field validation: per-field errors present"
            );
            return result;
        }

        for rule in &self.rules {
            rule(raw, &mut result);
        }

        debug!(
            options = result.values().len(),
            error_count = result.error_count(),
            rules = self.rules.len(),
            "Validated connector configuration"
        );
        result
    }

    fn validate_fields(&self, raw: &RawConfig) -> ValidationResult {
        let mut values = Vec::with_capacity(self.schema.options().len());

        for spec in self.schema.options() {
            let value = match self.schema.resolve(raw, &spec.name) {
                None => ConfigValue::invalid(
                    &spec.name,
                    ConfigurationError::missing_required(&spec.name).to_string(),
                ),
                Some(raw_value) => match spec.parse_value(&raw_value) {
                    Ok(parsed) => ConfigValue::valid(&spec.name, parsed),
                    Err(reason) => ConfigValue::invalid(
                        &spec.name,
                        ConfigurationError::parse(&spec.name, &raw_value, reason).to_string(),
                    ),
                },
            };
            values.push(value);
        }

        if self.schema.strictness() == Strictness::Strict {
            for key in self.schema.unknown_keys(raw) {
                values.push(ConfigValue::invalid(
                    key,
                    ConfigurationError::unknown_option(key).to_string(),
                ));
            }
        }

        ValidationResult { values }
    }
}
