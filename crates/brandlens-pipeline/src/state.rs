//! Forward-only run lifecycle.

use std::fmt;

/// Phase of a pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RunState {
    Idle,
    Discovering,
    Retrieving,
    ComputingMetrics,
    AnalyzingAi,
    Persisting,
    Done,
    Failed,
}

impl RunState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }

    /// Later phases may be skipped (`ComputingMetrics → Persisting` when
    /// analysis is off) but never revisited.
    #[must_use]
    pub fn can_transition_to(self, next: RunState) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == RunState::Failed || next > self
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Discovering => "discovering",
            RunState::Retrieving => "retrieving",
            RunState::ComputingMetrics => "computing_metrics",
            RunState::AnalyzingAi => "analyzing_ai",
            RunState::Persisting => "persisting",
            RunState::Done => "done",
            RunState::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the current [`RunState`] of one run.
#[derive(Debug)]
pub struct RunTracker {
    state: RunState,
}

impl RunTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Move to `next`. An illegal move is a bug in the orchestrator: it is
    /// logged, asserted in debug builds, and otherwise ignored.
    pub fn advance(&mut self, next: RunState) -> bool {
        let legal = self.state.can_transition_to(next);
        if !legal {
            tracing::error!(
                from = %self.state,
                to = %next,
                "bug: illegal run state transition"
            );
            debug_assert!(legal, "illegal run state transition {} -> {next}", self.state);
            return false;
        }
        tracing::debug!(from = %self.state, to = %next, "run state transition");
        self.state = next;
        true
    }
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}
