use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub upstream: UpstreamConfig,
}

/// Endpoints and transport policy for the three upstream services
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub repairs_url: String,
    pub sessions_url: String,
    pub machine_name_url: String,
    /// Per-attempt request timeout
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_base_delay: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `json` selects JSON output; anything else falls back to pretty
    fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            log_format: env::var("LOG_FORMAT")
                .map(|value| LogFormat::from_name(&value))
                .unwrap_or(LogFormat::Pretty),
            upstream: UpstreamConfig::from_env()?,
        };

        Ok(config)
    }
}

impl UpstreamConfig {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(UpstreamConfig {
            repairs_url: required_url("REPAIR_SERVICE_URL")?,
            sessions_url: required_url("SESSION_SERVICE_URL")?,
            machine_name_url: required_url("MACHINE_SERVICE_URL")?,
            timeout: Duration::from_secs(
                env::var("UPSTREAM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
            ),
            max_attempts: env::var("UPSTREAM_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            retry_base_delay: Duration::from_millis(
                env::var("UPSTREAM_RETRY_BASE_DELAY_MS")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()?,
            ),
        })
    }
}

/// Read a mandatory base URL; empty counts as unset
fn required_url(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    let value = env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format!("{name} must be set"))?;

    reqwest::Url::parse(&value).map_err(|e| format!("{name} is not a valid URL: {e}"))?;

    Ok(value)
}
