//! Core types for batch-select

use serde::{Deserialize, Serialize};

/// Published state of a [`SelectionCoordinator`](crate::SelectionCoordinator)
///
/// Equality is structural: two `InProgress` values are equal iff both counts match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionState {
    /// No campaign has run, or the previous campaign was reset
    #[default]
    Idle,
    /// A campaign is executing
    InProgress {
        /// Items the handler has been applied to so far
        selected: usize,
        /// Size of the campaign's item list, fixed for its lifetime
        total: usize,
    },
    /// The campaign processed every item
    Finished,
    /// The campaign was stopped before completion
    Cancelled,
}

impl SelectionState {
    /// Returns true for `Finished` and `Cancelled`
    pub fn is_terminal(&self) -> bool {
        matches!(self, SelectionState::Finished | SelectionState::Cancelled)
    }

    /// Count pair of an `InProgress` state, `None` otherwise
    pub fn progress(&self) -> Option<Progress> {
        match *self {
            SelectionState::InProgress { selected, total } => Some(Progress { selected, total }),
            _ => None,
        }
    }
}

impl std::fmt::Display for SelectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionState::Idle => write!(f, "idle"),
            SelectionState::InProgress { selected, total } => {
                write!(f, "in progress ({selected}/{total})")
            }
            SelectionState::Finished => write!(f, "finished"),
            SelectionState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Progress of a running campaign
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Progress {
    /// Items processed so far
    pub selected: usize,
    /// Total items in the campaign
    pub total: usize,
}

impl Progress {
    /// Fraction of items processed, in `0.0..=1.0`
    ///
    /// An empty campaign is vacuously complete, so `total == 0` yields `1.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use batch_select::Progress;
    ///
    /// assert_eq!(Progress { selected: 3, total: 12 }.fraction_completed(), 0.25);
    /// assert_eq!(Progress { selected: 0, total: 0 }.fraction_completed(), 1.0);
    /// ```
    pub fn fraction_completed(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.selected as f64 / self.total as f64
        }
    }

    /// Items not yet processed
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.selected)
    }
}
