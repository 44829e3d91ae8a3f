use std::{env, time::Duration};

use dotenv::dotenv;
use studentfit_client::{Token, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("STUDENTFIT_TIMEOUT_SECS must be a whole number of seconds, got \"{0}\"")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub client: studentfit_client::Config,
    /// Used when a request carries no bearer token of its own.
    pub token: Option<Token>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let timeout = match var("STUDENTFIT_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidTimeout(value.clone()))?,
            ),
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            bind_address: var("STUDENTFIT_BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned()),
            client: studentfit_client::Config {
                base_url: var("STUDENTFIT_HF_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
                timeout,
            },
            token: var("HF_TOKEN").and_then(Token::new),
        })
    }
}
