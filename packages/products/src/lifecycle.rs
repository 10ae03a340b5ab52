// ABOUTME: Stage transition policy for produce records
// ABOUTME: Centralizes the legal stage order instead of scattering checks per flow

use thiserror::Error;

use crate::types::Stage;

/// Rejected stage advancement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot advance from stage {from} to stage {to}")]
pub struct TransitionError {
    pub from: Stage,
    pub to: Stage,
}

impl Stage {
    /// Stages this stage may legally advance to
    pub fn allowed_next(self) -> &'static [Stage] {
        match self {
            Stage::Farmer => &[Stage::Middleman],
            Stage::Middleman => &[Stage::Retailer],
            Stage::Retailer => &[Stage::ReadyForSale],
            Stage::ReadyForSale => &[],
        }
    }

    /// Whether the record accepts no further appends
    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }
}

/// Check that `to` is a legal successor of `from`.
///
/// Skipping a stage, re-entering a stage, and advancing past the terminal
/// stage are all hard errors; every advance path goes through this check
/// before anything is written.
pub fn check_transition(from: Stage, to: Stage) -> Result<(), TransitionError> {
    if from.allowed_next().contains(&to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}
