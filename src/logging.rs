//! # Structured Logging Module
//!
//! Environment-aware structured logging for hosts and tools embedding the
//! connector engine. The engine itself only emits `tracing` events; this
//! module installs a subscriber for processes that do not already have one.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Environment variable selecting the default log level
pub const ENV_VAR: &str = "REDIS_CONNECT_ENV";

/// Environment variable selecting the output format (`json` or plain text)
pub const LOG_FORMAT_VAR: &str = "REDIS_CONNECT_LOG_FORMAT";

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let json = use_json_format();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));

        let registry = tracing_subscriber::registry().with(filter);
        let initialized = if json {
            registry
                .with(fmt::layer().with_target(true).with_ansi(false).json())
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(true).with_level(true))
                .try_init()
        };

        // A host that installed its own subscriber keeps it.
        if initialized.is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            json = json,
            "Structured logging initialized"
        );
    });
}

fn get_environment() -> String {
    std::env::var(ENV_VAR).unwrap_or_else(|_| "development".to_string())
}

fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

fn use_json_format() -> bool {
    std::env::var(LOG_FORMAT_VAR)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Log structured data for connector lifecycle operations
pub fn log_connector_operation(
    operation: &str,
    connector: &str,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        connector = %connector,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "CONNECTOR_OPERATION"
    );
}
