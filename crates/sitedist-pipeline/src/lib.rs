//! Background calculation runs for sitedist.
//!
//! An [`Orchestrator`] resolves a reference address and a list of sites on a
//! spawned task, routes from the reference to every resolved site, and
//! reports progress through an ordered stream of [`RunEvent`]s that the
//! consumer drains from a [`RunHandle`].

pub mod error;
pub mod events;
pub mod orchestrator;
pub mod state;
pub mod summary;

pub use error::PipelineError;
pub use events::{RunEvent, SiteUpdate};
pub use orchestrator::{
    Orchestrator, Pacing, RunHandle, EVENT_CHANNEL_CAPACITY, REFERENCE_NOT_FOUND,
};
pub use state::RunState;
pub use summary::RunSummary;
