//! Minimal behavior tree kernel used by the planner crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod behavior;
pub mod nodes;
pub mod status;

pub use behavior::{from_fn, Behavior, BtError, BtResult};
pub use nodes::{Composite, MemorizeSelector, Selector, Sequence};
pub use status::Status;
