use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://partyof4.db?mode=rwc";
pub const DEFAULT_FOURSQUARE_URL: &str = "https://api.foursquare.com";

// Range accepted by bcrypt.
const MIN_PASSWORD_COST: u32 = 4;
const MAX_PASSWORD_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Credentials and endpoint for the venue search API.
#[derive(Debug, Clone)]
pub struct FoursquareConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
}

impl FoursquareConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

impl Default for FoursquareConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            base_url: DEFAULT_FOURSQUARE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub password_cost: u32,
    pub foursquare: FoursquareConfig,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let foursquare = FoursquareConfig {
            client_id: lookup("FOURSQUARE_CLIENT_ID").unwrap_or_default(),
            client_secret: lookup("FOURSQUARE_CLIENT_SECRET").unwrap_or_default(),
            base_url: try_load(&lookup, "FOURSQUARE_API_URL", DEFAULT_FOURSQUARE_URL)?,
        };
        if !foursquare.is_configured() {
            warn!("Foursquare credentials not set, /locations will answer 500");
        }

        let password_cost: u32 =
            try_load(&lookup, "BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string())?;
        if !(MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(&password_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                message: format!(
                    "must be between {} and {}",
                    MIN_PASSWORD_COST, MAX_PASSWORD_COST
                ),
            });
        }

        Ok(Self {
            database_url: try_load(&lookup, "DATABASE_URL", DEFAULT_DATABASE_URL)?,
            host: try_load(&lookup, "HOST", "127.0.0.1")?,
            port: try_load(&lookup, "PORT", "3000")?,
            password_cost,
            foursquare,
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        });

    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        message: e.to_string(),
    })
}
