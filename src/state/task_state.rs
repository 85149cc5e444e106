/// Crawl task lifecycle definitions
///
/// A task starts in `Init`, moves to `Running` once its seed passes the
/// policy gate, and ends in one terminal state.
use crate::ScoutError;
use std::fmt;

/// Represents the current state of one website's crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task created, seed not yet checked
    Init,

    /// Traversal in progress
    Running,

    // ===== Terminal States =====
    /// Frontier drained within the page budget
    Completed,

    /// Page budget reached with pages still queued
    BudgetExhausted,

    /// Task ended before traversal (missing seed or robots.txt denial)
    Skipped,

    /// Traversal stopped by the cancellation signal
    Cancelled,
}

impl TaskState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Init | Self::Running)
    }

    /// Returns true if moving from this state to `next` is permitted
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::Running)
                | (Self::Init, Self::Skipped)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::BudgetExhausted)
                | (Self::Running, Self::Cancelled)
        )
    }

    /// Moves to `next`, rejecting transitions the lifecycle does not allow
    pub fn transition(self, next: TaskState) -> Result<TaskState, ScoutError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ScoutError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Short lowercase label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::BudgetExhausted => "budget_exhausted",
            Self::Skipped => "skipped",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns all terminal states
    pub fn terminal_states() -> [Self; 4] {
        [
            Self::Completed,
            Self::BudgetExhausted,
            Self::Skipped,
            Self::Cancelled,
        ]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
