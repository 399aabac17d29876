use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::leads::DEFAULT_RETENTION_DAYS;
use crate::valuation::{PolicyError, ScoringPolicy};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the offer desk.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub valuation: ValuationConfig,
}

/// Non-empty, trimmed value of an environment variable.
fn read_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = read_env("APP_ENV")
            .map(|value| AppEnvironment::from_str(&value))
            .unwrap_or(AppEnvironment::Development);

        let server = ServerConfig {
            host: read_env("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: match read_env("APP_PORT") {
                Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidPort)?,
                None => 3000,
            },
        };
        let telemetry = TelemetryConfig {
            log_level: read_env("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };
        let valuation = ValuationConfig {
            policy_path: read_env("SCORING_POLICY_PATH").map(PathBuf::from),
            retention_days: match read_env("LEAD_RETENTION_DAYS") {
                Some(value) => value
                    .parse::<u32>()
                    .ok()
                    .filter(|days| *days > 0)
                    .ok_or(ConfigError::InvalidRetention(value))?,
                None => DEFAULT_RETENTION_DAYS,
            },
        };

        Ok(Self {
            environment,
            server,
            telemetry,
            valuation,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Scoring policy source and lead retention.
#[derive(Debug, Clone)]
pub struct ValuationConfig {
    pub policy_path: Option<PathBuf>,
    pub retention_days: u32,
}

impl ValuationConfig {
    /// Policy from `policy_path`, or the standard revision when unset.
    pub fn load_policy(&self) -> Result<ScoringPolicy, ConfigError> {
        match &self.policy_path {
            Some(path) => ScoringPolicy::from_path(path).map_err(|source| ConfigError::Policy {
                path: path.clone(),
                source,
            }),
            None => Ok(ScoringPolicy::standard()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidRetention(String),
    Policy { path: PathBuf, source: PolicyError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRetention(value) => write!(
                f,
                "LEAD_RETENTION_DAYS must be a positive number of days, got '{value}'"
            ),
            ConfigError::Policy { path, source } => {
                write!(f, "scoring policy {} is unusable: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidRetention(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Policy { source, .. } => Some(source),
        }
    }
}
