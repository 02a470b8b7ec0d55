use pabt_bt::BtError;
use thiserror::Error;

/// Rejected construction of a [`Conditions`](crate::Conditions) set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConditionsError {
    #[error("conditions must contain at least one condition")]
    Empty,
    #[error("duplicate condition key: {0}")]
    DuplicateKey(String),
}

/// Rejected construction of an [`Effects`](crate::Effects) set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EffectsError {
    #[error("duplicate effect key: {0}")]
    DuplicateKey(String),
}

/// Errors surfaced by [`Plan::tick`](crate::Plan::tick).
///
/// Any error aborts the tick that produced it; the plan itself is left
/// intact and may be ticked again.
#[derive(Debug, Error)]
pub enum PlanError<E> {
    /// A variable read or action generation failed.
    #[error("state error: {0}")]
    State(#[source] E),
    /// An action's behavior leaf reported an error.
    #[error("behavior error: {0}")]
    Leaf(#[source] BtError),
}
