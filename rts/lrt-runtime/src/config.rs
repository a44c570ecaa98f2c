//! Runtime configuration.

use std::env;

use tracing::Level;

use crate::ConfigError;

const LINE_BUFFERED_VAR: &str = "LRT_LINE_BUFFERED";
const BUFFER_CAPACITY_VAR: &str = "LRT_BUFFER_CAPACITY";
const LOG_VAR: &str = "LRT_LOG";

/// Configuration for a [`RuntimeContext`](crate::RuntimeContext).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Flush standard output and error at every newline.
    pub line_buffered: bool,
    /// Capacity of the output buffers in bytes.
    pub buffer_capacity: usize,
    /// Most verbose level the runtime logs at.
    pub log_level: Level,
    /// Keep output in memory instead of writing to the process streams.
    pub capture_output: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            line_buffered: true,
            buffer_capacity: 8 * 1024, // 8 KB
            log_level: Level::WARN,
            capture_output: false,
        }
    }
}

impl RuntimeConfig {
    /// Configuration whose handles write to memory.
    ///
    /// Used for tests and for embedding the runtime in another program.
    #[must_use]
    pub fn captured() -> Self {
        Self {
            capture_output: true,
            ..Self::default()
        }
    }

    /// Reads overrides from the `LRT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Reads overrides through `lookup`, starting from the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(LINE_BUFFERED_VAR) {
            config.line_buffered = parse_bool(LINE_BUFFERED_VAR, &value)?;
        }

        if let Some(value) = lookup(BUFFER_CAPACITY_VAR) {
            config.buffer_capacity = match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidCapacity {
                        var: BUFFER_CAPACITY_VAR,
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup(LOG_VAR) {
            config.log_level = value
                .trim()
                .parse::<Level>()
                .map_err(|_| ConfigError::InvalidLevel { var: LOG_VAR, value })?;
        }

        Ok(config)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}
