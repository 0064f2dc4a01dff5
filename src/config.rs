/*
 * Responsibility
 * - 環境変数 / .env からの設定読み込み (DATABASE_URL, トークン寿命, HTTP 制限など)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::middleware::http::HttpLimits;
use crate::services::auth::TokenLifetimes;

// Upper bound for token ttl and sweep grace: one leap year.
const MAX_WINDOW_SECONDS: u64 = 366 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // None => in-memory store (development only)
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    pub token_lifetimes: TokenLifetimes,
    pub sweep_interval: Duration,

    pub http_limits: HttpLimits,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_or("PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        if database_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 5)?;

        let defaults = TokenLifetimes::default();
        let token_lifetimes = TokenLifetimes {
            ttl_seconds: check_window(
                "TOKEN_TTL_SECONDS",
                parse_or("TOKEN_TTL_SECONDS", defaults.ttl_seconds)?,
            )?,
            sweep_grace_seconds: check_window(
                "SWEEP_GRACE_SECONDS",
                parse_or("SWEEP_GRACE_SECONDS", defaults.sweep_grace_seconds)?,
            )?,
        };
        if token_lifetimes.ttl_seconds == 0 {
            return Err(ConfigError::Invalid("TOKEN_TTL_SECONDS"));
        }

        let sweep_interval_seconds: u64 = parse_or("SWEEP_INTERVAL_SECONDS", 300)?;
        if sweep_interval_seconds == 0 {
            return Err(ConfigError::Invalid("SWEEP_INTERVAL_SECONDS"));
        }

        let default_limits = HttpLimits::default();
        let body_limit_bytes: usize = parse_or("BODY_LIMIT_BYTES", default_limits.body_limit_bytes)?;
        let request_timeout_seconds: u64 = parse_or(
            "REQUEST_TIMEOUT_SECONDS",
            default_limits.request_timeout.as_secs(),
        )?;
        if body_limit_bytes == 0 {
            return Err(ConfigError::Invalid("BODY_LIMIT_BYTES"));
        }
        if request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
        }

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            token_lifetimes,
            sweep_interval: Duration::from_secs(sweep_interval_seconds),
            http_limits: HttpLimits {
                body_limit_bytes,
                request_timeout: Duration::from_secs(request_timeout_seconds),
            },
        })
    }
}

// Unset => default; set but unparsable => Invalid.
fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

// Token expiry and sweep cutoff are computed from these; keep them well inside chrono's range.
fn check_window(key: &'static str, secs: u64) -> Result<u64, ConfigError> {
    if secs > MAX_WINDOW_SECONDS {
        return Err(ConfigError::Invalid(key));
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_parsing() {
        assert_eq!(AppEnv::parse("prod"), AppEnv::Production);
        assert_eq!(AppEnv::parse("PRODUCTION"), AppEnv::Production);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Development);
    }

    #[test]
    fn parse_or_defaults_when_unset() {
        let unset: u64 = parse_or("RECORDS_AUTH_TEST_SURELY_UNSET", 42).unwrap();
        assert_eq!(unset, 42);
    }

    #[test]
    fn lifetime_windows_are_bounded() {
        assert_eq!(check_window("TOKEN_TTL_SECONDS", 7_200).unwrap(), 7_200);
        assert_eq!(
            check_window("TOKEN_TTL_SECONDS", MAX_WINDOW_SECONDS).unwrap(),
            MAX_WINDOW_SECONDS
        );
        assert!(matches!(
            check_window("TOKEN_TTL_SECONDS", 20_000_000_000_000),
            Err(ConfigError::Invalid("TOKEN_TTL_SECONDS"))
        ));
        assert!(matches!(
            check_window("SWEEP_GRACE_SECONDS", u64::MAX),
            Err(ConfigError::Invalid("SWEEP_GRACE_SECONDS"))
        ));
    }
}
