use std::env;
use std::fmt::{self, Display};
use std::path::PathBuf;
use std::time::Duration;

use converse_core::DEFAULT_REQUEST_TIMEOUT;
use converse_http_model::{HttpConfig, HttpConfigBuilder};

/// Settings read from the environment.
#[derive(Debug)]
pub struct Config {
    pub http: HttpConfig,
    pub request_timeout: Duration,
    pub html_out: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => {
                write!(f, "{name} environment variable is not set")
            }
            ConfigError::Invalid(name, value) => {
                write!(f, "{name} has an invalid value: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = lookup("CONVERSE_BASE_URL")
            .ok_or(ConfigError::Missing("CONVERSE_BASE_URL"))?;
        let mut http = HttpConfigBuilder::with_base_url(base_url);
        if let Some(route) = lookup("CONVERSE_ROUTE") {
            http = http.with_route(route);
        }
        if let Some(token) = lookup("CONVERSE_TOKEN") {
            http = http.with_bearer_token(token);
        }

        let request_timeout = match lookup("CONVERSE_TIMEOUT_SECS") {
            Some(secs) => secs
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid("CONVERSE_TIMEOUT_SECS", secs))?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            http: http.build(),
            request_timeout,
            html_out: lookup("CONVERSE_HTML_OUT").map(PathBuf::from),
        })
    }
}
