use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    // Public holidays
    pub holiday_api_base: String,
    pub holiday_country: String,
    pub holiday_timeout: Duration,

    /// How often the pending calendar feed is reloaded from the database.
    pub pending_refresh: Duration,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));
        let or_default =
            |name: &'static str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let number = |name: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(name) {
                None => Ok(default),
                Some(value) => value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid { name, value }),
            }
        };

        let rate_protected_per_min = u32::try_from(number("RATE_PROTECTED_PER_MIN", 1000)?)
            .map_err(|_| ConfigError::Invalid {
                name: "RATE_PROTECTED_PER_MIN",
                value: or_default("RATE_PROTECTED_PER_MIN", ""),
            })?;

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            api_prefix: or_default("API_PREFIX", "/api"),
            rate_protected_per_min,
            holiday_api_base: or_default("HOLIDAY_API_BASE", "https://date.nager.at/api/v3"),
            holiday_country: or_default("HOLIDAY_COUNTRY", "PH").to_uppercase(),
            holiday_timeout: Duration::from_secs(number("HOLIDAY_TIMEOUT_SECS", 10)?),
            pending_refresh: Duration::from_secs(number("PENDING_REFRESH_SECS", 30)?.max(1)),
            log_dir: or_default("LOG_DIR", "logs"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("SERVER_ADDR", "127.0.0.1:8080"),
        ("DATABASE_URL", "mysql://salon@localhost/salon"),
        ("JWT_SECRET", "secret"),
    ];

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.rate_protected_per_min, 1000);
        assert_eq!(config.holiday_country, "PH");
        assert_eq!(config.holiday_timeout, Duration::from_secs(10));
        assert_eq!(config.pending_refresh, Duration::from_secs(30));
        assert_eq!(config.log_dir, "logs");
    }

    #[test]
    fn missing_required_is_an_error() {
        let err = Config::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn bad_number_is_an_error() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("HOLIDAY_TIMEOUT_SECS", "soon"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "HOLIDAY_TIMEOUT_SECS", .. }));
    }
}
