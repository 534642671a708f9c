use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Floor for the inter-attempt and inter-site delays. Public geocoders
/// throttle clients that issue more than about two requests per second.
pub const MIN_PACING_DELAY_MS: u64 = 500;

const CACHE_FILE_NAME: &str = ".address_distance_cache.json";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_delay = |var: &str| -> Result<u64, ConfigError> {
        let ms = parse_u64(var, &MIN_PACING_DELAY_MS.to_string())?;
        if ms < MIN_PACING_DELAY_MS {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("must be at least {MIN_PACING_DELAY_MS} ms"),
            });
        }
        Ok(ms)
    };

    let cache_path = match lookup("SITEDIST_CACHE_PATH") {
        Ok(path) => PathBuf::from(path),
        Err(_) => default_cache_path(&lookup),
    };

    let geocoder_url = or_default(
        "SITEDIST_GEOCODER_URL",
        "https://nominatim.openstreetmap.org",
    );
    let router_url = or_default("SITEDIST_ROUTER_URL", "https://router.project-osrm.org");
    let user_agent = or_default(
        "SITEDIST_USER_AGENT",
        "sitedist/0.1 (address-distance-ranking)",
    );
    let country_codes = or_default("SITEDIST_COUNTRY_CODES", "au");
    let log_level = or_default("SITEDIST_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("SITEDIST_REQUEST_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SITEDIST_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let geocode_max_attempts = parse_usize("SITEDIST_GEOCODE_MAX_ATTEMPTS", "6")?;
    if geocode_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SITEDIST_GEOCODE_MAX_ATTEMPTS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let attempt_delay_ms = parse_delay("SITEDIST_ATTEMPT_DELAY_MS")?;
    let site_delay_ms = parse_delay("SITEDIST_SITE_DELAY_MS")?;

    Ok(AppConfig {
        cache_path,
        geocoder_url,
        router_url,
        user_agent,
        country_codes,
        request_timeout_secs,
        geocode_max_attempts,
        attempt_delay_ms,
        site_delay_ms,
        log_level,
    })
}

/// `$HOME/.address_distance_cache.json`, falling back to `%USERPROFILE%` and
/// finally the working directory.
fn default_cache_path<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    lookup("HOME")
        .or_else(|_| lookup("USERPROFILE"))
        .map_or_else(|_| PathBuf::from(CACHE_FILE_NAME), |home| {
            PathBuf::from(home).join(CACHE_FILE_NAME)
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
