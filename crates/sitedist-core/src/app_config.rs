use std::path::PathBuf;

/// Runtime settings for the geocoding and routing providers, pacing, and the
/// coordinate cache location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub cache_path: PathBuf,
    pub geocoder_url: String,
    pub router_url: String,
    pub user_agent: String,
    pub country_codes: String,
    pub request_timeout_secs: u64,
    pub geocode_max_attempts: usize,
    pub attempt_delay_ms: u64,
    pub site_delay_ms: u64,
    pub log_level: String,
}
