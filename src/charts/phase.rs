use serde::{Deserialize, Serialize};
use std::fmt;

/// Which priority tier of the progressive loader has been fully admitted.
///
/// Phases only move forward within a loading session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum LoadingPhase {
    #[default]
    Initial,
    Tier1,
    Complete,
}

impl LoadingPhase {
    /// Moves to `next` if that is a forward step. Returns whether it moved.
    pub fn advance_to(&mut self, next: LoadingPhase) -> bool {
        if next > *self {
            *self = next;
            true
        } else {
            false
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, LoadingPhase::Complete)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadingPhase::Initial => "initial",
            LoadingPhase::Tier1 => "tier1",
            LoadingPhase::Complete => "complete",
        }
    }
}

impl fmt::Display for LoadingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
