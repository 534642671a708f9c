use std::path::PathBuf;

use thiserror::Error;

/// Failures talking to the geocoding or routing provider.
///
/// None of these abort a calculation run: the resolver moves on to its next
/// fallback query and the route service falls back to great-circle distance.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The routing provider answered but reported no usable route.
    #[error("no route: {0}")]
    NoRoute(String),

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Failures reading or writing the coordinate cache file.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
