//! Worker Lifecycle
//!
//! State machine for the cache worker. Install and activation each own
//! a transient state, and `Failed` is terminal: a worker that could not
//! pre-cache its manifest never serves anything.

use core::fmt;

/// Cache worker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Created, no lifecycle event has run yet.
    New,
    /// Install running: pre-caching the asset manifest.
    Installing,
    /// Pre-cache committed, ready to activate.
    Installed,
    /// Activation running: pruning stale generations.
    Activating,
    /// Controlling clients and intercepting fetches.
    Active,
    /// Install failed. Terminal.
    Failed,
}

impl Default for WorkerState {
    fn default() -> Self {
        Self::New
    }
}

impl WorkerState {
    /// Check if the worker is active.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Check if the worker failed installation.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Check if fetch events may be intercepted in this state.
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "new",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Check if a state transition is valid.
pub fn is_valid_transition(from: WorkerState, to: WorkerState) -> bool {
    use WorkerState::*;

    matches!(
        (from, to),
        // Normal lifecycle
        (New, Installing)
            | (Installing, Installed)
            | (Installed, Activating)
            | (Activating, Active)
            // Install failure
            | (Installing, Failed)
    )
}
