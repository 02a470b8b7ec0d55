#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of ticking a behavior tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    Running,
    Success,
    Failure,
}

impl Status {
    /// `true` for `Success` and `Failure`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Running)
    }
}
