#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = ".railway/config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// Artificial delay added to every storage call.
    pub latency_ms: u64,
    pub max_concurrency: usize,
    pub batch_size: usize,
    pub log_filter: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            latency_ms: 5,
            max_concurrency: 4,
            batch_size: 10,
            log_filter: "info".to_string(),
        }
    }
}

impl DemoConfig {
    #[must_use]
    pub const fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// Reads the config file at `path`, or at the default location. A missing
/// file yields the defaults.
///
/// # Errors
///
/// Returns `ConfigError::Io` when the file exists but cannot be read, and
/// `ConfigError::InvalidValue` when a value does not parse.
pub async fn load_config(path: Option<PathBuf>) -> Result<DemoConfig, ConfigError> {
    let config_path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    if !config_path.exists() {
        return Ok(DemoConfig::default());
    }

    let content = tokio::fs::read_to_string(&config_path)
        .await
        .map_err(|source| ConfigError::Io {
            path: config_path.clone(),
            source,
        })?;

    parse_config_content(&content)
}

/// Parses `key = value` lines. Unknown keys are ignored.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for numbers that do not parse and for
/// a zero `max_concurrency` or `batch_size`.
pub fn parse_config_content(content: &str) -> Result<DemoConfig, ConfigError> {
    let mut config = DemoConfig::default();

    for line in content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
    {
        if let Some(value) = parse_key_value(line, "latency_ms") {
            config.latency_ms = parse_number("latency_ms", &expand_env_vars(value))?;
        }
        if let Some(value) = parse_key_value(line, "max_concurrency") {
            config.max_concurrency = parse_positive("max_concurrency", &expand_env_vars(value))?;
        }
        if let Some(value) = parse_key_value(line, "batch_size") {
            config.batch_size = parse_positive("batch_size", &expand_env_vars(value))?;
        }
        if let Some(value) = parse_key_value(line, "log_filter") {
            config.log_filter = expand_env_vars(value);
        }
    }

    Ok(config)
}

fn parse_number<N: FromStr>(key: &str, value: &str) -> Result<N, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_positive(key: &str, value: &str) -> Result<usize, ConfigError> {
    parse_number(key, value).and_then(|parsed: usize| {
        if parsed == 0 {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            })
        } else {
            Ok(parsed)
        }
    })
}

/// Replaces `${VAR}` and `${VAR:-default}` with the environment's value.
/// Substituted text is never expanded again. An unterminated `${` is kept
/// as written.
fn expand_env_vars(input: &str) -> String {
    let mut expanded = String::with_capacity(input.len());
    let mut rest = input;
    while let Some((before, after)) = rest.split_once("${") {
        let Some((reference, remainder)) = after.split_once('}') else {
            break;
        };
        let (name, default) = reference.split_once(":-").unwrap_or((reference, ""));
        expanded.push_str(before);
        expanded.push_str(&std::env::var(name).unwrap_or_else(|_| default.to_string()));
        rest = remainder;
    }
    expanded.push_str(rest);
    expanded
}

#[must_use]
pub fn parse_key_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    line.split_once('=')
        .and_then(|(lhs, rhs)| (lhs.trim() == key).then_some(rhs.trim().trim_matches('"')))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_gives_defaults() {
        assert_eq!(parse_config_content("").unwrap(), DemoConfig::default());
    }

    #[test]
    fn reads_known_keys_and_skips_comments() {
        let config = parse_config_content(
            "# demo\nlatency_ms = 0\nmax_concurrency = 8\nbatch_size=3\nlog_filter = \"railway=debug\"\nunknown = 1\n",
        )
        .unwrap();
        assert_eq!(
            config,
            DemoConfig {
                latency_ms: 0,
                max_concurrency: 8,
                batch_size: 3,
                log_filter: "railway=debug".to_string(),
            }
        );
    }

    #[test]
    fn rejects_non_numeric_and_zero_sizes() {
        let bad = parse_config_content("latency_ms = soon").unwrap_err();
        assert!(matches!(
            bad,
            ConfigError::InvalidValue { ref key, ref value } if key == "latency_ms" && value == "soon"
        ));
        assert!(parse_config_content("batch_size = 0").is_err());
        assert!(parse_config_content("max_concurrency = -1").is_err());
    }

    #[test]
    fn env_default_is_used_when_variable_is_unset() {
        let config =
            parse_config_content("max_concurrency = ${RAILWAY_TEST_SURELY_UNSET_VAR:-6}").unwrap();
        assert_eq!(config.max_concurrency, 6);
    }

    #[test]
    fn expanded_values_are_not_expanded_again() {
        std::env::set_var("RAILWAY_TEST_SELF_REFERENCE", "${RAILWAY_TEST_SELF_REFERENCE}");
        assert_eq!(
            expand_env_vars("a=${RAILWAY_TEST_SELF_REFERENCE} b=${RAILWAY_TEST_SURELY_UNSET_VAR:-2}"),
            "a=${RAILWAY_TEST_SELF_REFERENCE} b=2"
        );
    }

    #[test]
    fn unterminated_reference_is_left_as_written() {
        assert_eq!(
            expand_env_vars("x=${RAILWAY_TEST_SURELY_UNSET_VAR:-1} y=${OPEN"),
            "x=1 y=${OPEN"
        );
    }

    #[test]
    fn key_value_requires_exact_key() {
        assert_eq!(parse_key_value("batch_size = 4", "batch_size"), Some("4"));
        assert_eq!(parse_key_value("batch_sizes = 4", "batch_size"), None);
        assert_eq!(parse_key_value("no equals", "batch_size"), None);
    }

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(dir.path().join("absent.toml"))).await.unwrap();
        assert_eq!(config, DemoConfig::default());
    }

    #[tokio::test]
    async fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "latency_ms = 1\nbatch_size = 2\n").unwrap();

        let config = load_config(Some(path)).await.unwrap();
        assert_eq!(config.latency(), Duration::from_millis(1));
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.max_concurrency, 4);
    }
}
