//! Planning and acting with behavior trees.
//!
//! Builds and executes a behavior tree that drives a mutable [`State`]
//! toward a goal expressed as a disjunction of condition conjunctions.
//! The tree grows on demand: when a tick fails on a condition, the
//! planner asks the state for actions whose declared effects would
//! satisfy it, splices the best-effort subtree in place of the failed
//! check, and reorders it ahead of any earlier action that would undo
//! its preconditions. Plan refinement and execution interleave; there
//! is no offline planning phase.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

mod compile;
pub mod error;
mod expand;
pub mod plan;
mod resolve;
pub mod state;
mod tick;
pub mod trace;
mod tree;

pub use error::{ConditionsError, EffectsError, PlanError};
pub use plan::Plan;
pub use state::{Action, Condition, Conditions, Effect, Effects, State};
pub use trace::{TraceEvent, TraceSink};

pub use pabt_bt::{Behavior, BtError, BtResult, Status};
