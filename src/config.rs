use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::research::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

#[derive(Error, Debug, PartialEq)]
#[error("{name} must be a valid number, got {value:?}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub research_model: String,
    pub research_max_tokens: u32,
    pub research_temperature: f32,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        Ok(Self {
            port: parse_var(&lookup, "APP_PORT", 8080)?,
            environment: var_or("APP_ENVIRONMENT", "development"),
            anthropic_api_key: lookup("ANTHROPIC_API_KEY").filter(|key| !key.trim().is_empty()),
            anthropic_base_url: var_or("ANTHROPIC_BASE_URL", "https://api.anthropic.com"),
            research_model: var_or("RESEARCH_MODEL", DEFAULT_MODEL),
            research_max_tokens: parse_var(&lookup, "RESEARCH_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            research_temperature: parse_temperature(&lookup)?,
            otel_service_name: var_or("OTEL_SERVICE_NAME", "market-research-agent"),
            otel_exporter_endpoint: var_or("OTEL_EXPORTER_OTLP_ENDPOINT", "http://localhost:4317"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError { name, value }),
        None => Ok(default),
    }
}

/// Non-finite values parse as `f32` but would serialize as `null` in the
/// request body, so they are rejected alongside malformed input.
fn parse_temperature<F>(lookup: &F) -> Result<f32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    const NAME: &str = "RESEARCH_TEMPERATURE";
    let temperature = parse_var(lookup, NAME, DEFAULT_TEMPERATURE)?;
    if temperature.is_finite() {
        Ok(temperature)
    } else {
        Err(ConfigError {
            name: NAME,
            value: lookup(NAME).unwrap_or_default(),
        })
    }
}
