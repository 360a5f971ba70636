//! Typed environment variables
//!
//! Every variable the tool reads is declared once here, with its default and
//! a description, so that parsing and documentation stay in one place.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Environment variable parsing error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Environment variable '{variable}': {message}")]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

pub type EnvResult<T> = Result<T, EnvError>;

pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => match Self::DEFAULT {
                Some(default) => Ok(default),
                None => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Required environment variable not set".to_string(),
                }),
            },
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// Output and logging
pub mod output {
    use super::*;

    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "GR8S_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("warn".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // Any non-empty value disables color
            Ok(!value.is_empty())
        }
    }
}

/// Change verification
pub mod verify {
    use super::*;

    pub struct DiffTimeout;
    impl EnvVar<Duration> for DiffTimeout {
        const NAME: &'static str = "GR8S_DIFF_TIMEOUT_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(1000));
        const DESCRIPTION: &'static str =
            "Time budget of the change diff in milliseconds (0 gives a coarse diff)";

        fn parse(value: &str) -> EnvResult<Duration> {
            let millis = parse_positive_usize(value, Self::NAME, 0, 600_000)?;
            Ok(Duration::from_millis(millis as u64))
        }
    }

    pub struct DiffContext;
    impl EnvVar<usize> for DiffContext {
        const NAME: &'static str = "GR8S_DIFF_CONTEXT";
        const DEFAULT: Option<usize> = Some(crate::verify::CONTEXT_WIDTH);
        const DESCRIPTION: &'static str =
            "Chars of unchanged text shown around each change in the verbose report";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 0, 1024)
        }
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub log_level: String,
    pub no_color: bool,
    pub diff_timeout: Duration,
    pub diff_context: usize,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            no_color: false,
            diff_timeout: crate::verify::DEFAULT_DIFF_TIMEOUT,
            diff_context: crate::verify::CONTEXT_WIDTH,
        }
    }
}

impl EnvConfig {
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: output::LogLevel::get()?,
            no_color: output::NoColor::get()?,
            diff_timeout: verify::DiffTimeout::get()?,
            diff_context: verify::DiffContext::get()?,
        })
    }
}

/// Every variable with its description and default, appended to `--help`
pub fn generate_env_docs() -> String {
    let entries = [
        (output::LogLevel::NAME, output::LogLevel::DESCRIPTION, "warn".to_string()),
        (output::NoColor::NAME, output::NoColor::DESCRIPTION, "unset".to_string()),
        (
            verify::DiffTimeout::NAME,
            verify::DiffTimeout::DESCRIPTION,
            crate::verify::DEFAULT_DIFF_TIMEOUT.as_millis().to_string(),
        ),
        (
            verify::DiffContext::NAME,
            verify::DiffContext::DESCRIPTION,
            crate::verify::CONTEXT_WIDTH.to_string(),
        ),
    ];

    let mut docs = String::from("Environment variables:\n");
    for (name, description, default) in entries {
        docs.push_str(&format!("  {name}\n      {description} (default: {default})\n"));
    }

    docs
}
