use std::env;
use std::time::Duration;
use url::Url;

use crate::services::coupon_service::StaticCouponTable;

pub const HOST: &str = "0.0.0.0";
pub const PORT: u16 = 8080;
pub const BOOKING_API_URL: &str = "http://localhost:5000/";
pub const BOOKING_TIMEOUT_SECS: u64 = 10;
pub const DRAFT_TTL_SECS: u64 = 30 * 60;
pub const CHECKOUT_REDIRECT_DELAY_MS: u64 = 2000;

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
    InvalidCoupons(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
            ConfigError::InvalidCoupons(err) => write!(f, "Invalid COUPONS: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub booking_api_url: Url,
    pub booking_timeout: Duration,
    pub draft_ttl: Duration,
    pub redirect_delay: Duration,
    pub coupons: StaticCouponTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            booking_api_url: Url::parse(BOOKING_API_URL).expect("default booking URL is valid"),
            booking_timeout: Duration::from_secs(BOOKING_TIMEOUT_SECS),
            draft_ttl: Duration::from_secs(DRAFT_TTL_SECS),
            redirect_delay: Duration::from_millis(CHECKOUT_REDIRECT_DELAY_MS),
            coupons: StaticCouponTable::default(),
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

fn env_parsed<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env_opt(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

/// `Url::join` drops the last path segment unless the base ends in a slash.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&with_slash).map_err(|_| ConfigError::InvalidValue {
        key: "BOOKING_API_URL",
        value: raw.to_string(),
    })
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let booking_api_url = match env_opt("BOOKING_API_URL") {
            Some(raw) => parse_base_url(&raw)?,
            None => parse_base_url(BOOKING_API_URL)?,
        };

        let coupons = match env_opt("COUPONS") {
            Some(raw) => StaticCouponTable::parse(&raw)
                .map_err(|e| ConfigError::InvalidCoupons(e.to_string()))?,
            None => StaticCouponTable::default(),
        };

        Ok(Self {
            host: env_opt("HOST").unwrap_or_else(|| HOST.to_string()),
            port: env_parsed("PORT", PORT)?,
            booking_api_url,
            booking_timeout: Duration::from_secs(env_parsed(
                "BOOKING_TIMEOUT_SECS",
                BOOKING_TIMEOUT_SECS,
            )?),
            draft_ttl: Duration::from_secs(env_parsed("DRAFT_TTL_SECS", DRAFT_TTL_SECS)?),
            redirect_delay: Duration::from_millis(env_parsed(
                "CHECKOUT_REDIRECT_DELAY_MS",
                CHECKOUT_REDIRECT_DELAY_MS,
            )?),
            coupons,
        })
    }
}
