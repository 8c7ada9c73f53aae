//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for log output.
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
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "remote-sysrq".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `RSQ_SERVICE_NAME`: Service name (default: remote-sysrq)
    /// - `RSQ_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `RSQ_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `RSQ_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("RSQ_SERVICE_NAME")
                .unwrap_or_else(|_| "remote-sysrq".to_string()),

            log_level: env::var("RSQ_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("RSQ_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v, true))
                .unwrap_or(true),

            json_logs: env::var("RSQ_JSON_LOGS")
                .map(|v| parse_flag(&v, false))
                .unwrap_or(false),
        }
    }

    /// Configuration for a named tool, keeping the rest from the environment.
    pub fn for_tool(tool_name: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = format!("remote-sysrq-{}", tool_name);
        config
    }

    /// Raise the level to `debug` when verbose output was requested.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        if verbose {
            self.log_level = "debug".to_string();
        }
        self
    }
}

/// Interpret a boolean-ish environment value, falling back to `default`.
pub(crate) fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
