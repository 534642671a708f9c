//! Shared domain types for the sitedist address-ranking pipeline.
//!
//! Holds the address and site model, the closed result-tag vocabulary,
//! the tag filter used to rank reported results, and environment-driven
//! application configuration.

pub mod address;
pub mod app_config;
pub mod config;
pub mod error;
pub mod rank;
pub mod result;
pub mod site;

pub use address::Address;
pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, MIN_PACING_DELAY_MS};
pub use error::{ConfigError, CoreError};
pub use rank::{filter_ranked, RankedResult, TagFilter};
pub use result::{
    classify_match, sort_by_distance, DistanceResult, ResultTag, TagCounts, CACHED_LABEL,
    NOT_FOUND_LABEL,
};
pub use site::{Coordinates, LocationMatch, SiteRecord, SiteStatus};
