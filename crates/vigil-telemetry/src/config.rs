//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Build flavor (debug, release, ci)
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "vigil-client".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            environment: "debug".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: vigil-client)
    /// - `VIGIL_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `VIGIL_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `VIGIL_JSON_LOGS`: Enable JSON logs (default: true under CI)
    /// - `VIGIL_ENVIRONMENT`: Build flavor (default: debug)
    pub fn from_env() -> Self {
        let is_ci = env::var("CI").is_ok();

        Self {
            service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "vigil-client".to_string()),

            log_level: env::var("VIGIL_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("VIGIL_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),

            json_logs: env::var("VIGIL_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(is_ci),

            environment: env::var("VIGIL_ENVIRONMENT").unwrap_or_else(|_| {
                if is_ci {
                    "ci".to_string()
                } else {
                    "debug".to_string()
                }
            }),
        }
    }

    /// Configuration for tests: debug level, console only.
    pub fn for_tests() -> Self {
        Self {
            log_level: "debug".to_string(),
            environment: "test".to_string(),
            ..Self::default()
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
