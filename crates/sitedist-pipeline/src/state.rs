use std::fmt;

use serde::Serialize;

/// Lifecycle of one calculation run.
///
/// `Idle` until the first run starts; a finished run leaves its terminal
/// state (`Complete`, `Cancelled` or `Error`) visible until the next one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    ResolvingReference,
    ResolvingSites,
    Finalizing,
    Complete,
    Cancelled,
    Error,
}

impl RunState {
    /// Whether a run in this state has finished.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Complete | RunState::Cancelled | RunState::Error)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::ResolvingReference => "resolving_reference",
            RunState::ResolvingSites => "resolving_sites",
            RunState::Finalizing => "finalizing",
            RunState::Complete => "complete",
            RunState::Cancelled => "cancelled",
            RunState::Error => "error",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
