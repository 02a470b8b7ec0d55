use std::sync::mpsc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One refinement step taken by the driver, stamped with the
/// plan-local tick that performed it.
///
/// Ordinary ticks that just execute the tree are not reported; events
/// only mark the points where the plan itself changed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TraceEvent {
    /// The goal was compiled into a fresh tree, either on the first
    /// tick or on the first tick after a discard.
    Compiled {
        tick: u64,
        /// Alternative conjunctions in the goal.
        alternatives: usize,
    },
    /// A failed precondition was expanded into a
    /// postcondition-precondition-action subtree.
    Expanded {
        tick: u64,
        /// Tree size after the expansion.
        nodes: usize,
        /// Leftward moves conflict resolution applied to the new
        /// subtree.
        promotions: usize,
    },
    /// No expandable condition was left; the refinement was thrown
    /// away.
    Discarded { tick: u64 },
}

impl TraceEvent {
    pub fn tick(&self) -> u64 {
        match *self {
            TraceEvent::Compiled { tick, .. }
            | TraceEvent::Expanded { tick, .. }
            | TraceEvent::Discarded { tick } => tick,
        }
    }
}

/// Receives refinement events from a running plan.
pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

/// Channel senders work as sinks, which keeps events observable while
/// the plan owns the sink. A disconnected receiver drops events.
impl TraceSink for mpsc::Sender<TraceEvent> {
    fn emit(&mut self, event: TraceEvent) {
        let _ = self.send(event);
    }
}
