use sitedist_core::CoreError;
use thiserror::Error;

/// Reasons a calculation run is refused before any work starts.
///
/// Failures once the run is under way are reported as events, not as
/// errors from [`crate::Orchestrator::start`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("reference address is blank")]
    BlankReference,

    #[error("no site addresses to process")]
    NoSites,

    #[error("site {index} is incomplete: {source}")]
    InvalidSite {
        index: usize,
        #[source]
        source: CoreError,
    },

    #[error("a calculation is already running")]
    RunActive,
}
