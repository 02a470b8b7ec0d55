use pabt_bt::{Behavior, BtResult, Status};

use crate::error::PlanError;
use crate::state::{Conditions, State};
use crate::trace::{TraceEvent, TraceSink};
use crate::tree::PlanTree;

/// An incrementally refined plan driving a [`State`] toward a goal.
///
/// The goal is a disjunction of condition conjunctions; at least one
/// conjunction must eventually hold. Each [`tick`](Plan::tick) either
/// makes progress, reports that the goal holds, or grows the tree by
/// expanding a failed precondition into a
/// postcondition-precondition-action subtree and reordering it ahead
/// of any earlier action that would undo its preconditions.
///
/// Refinement happens in the same tick that observed the failure, so a
/// `Running` result after a failure means "the tree grew, tick again".
/// A `Failure` result means the current refinement went stale and was
/// discarded; the next tick recompiles from the goal and starts over.
pub struct Plan<S: State> {
    goal: Vec<Conditions<S>>,
    tree: Option<PlanTree<S>>,
    sink: Option<Box<dyn TraceSink>>,
    ticks: u64,
    expansions: u64,
    discards: u64,
}

impl<S: State> Plan<S> {
    /// Create a plan for `goal`. An empty goal succeeds immediately.
    ///
    /// Conjunctions are validated when constructed (see
    /// [`Conditions::new`]), so a goal that type-checks compiles.
    pub fn new(goal: Vec<Conditions<S>>) -> Self {
        Self {
            goal,
            tree: None,
            sink: None,
            ticks: 0,
            expansions: 0,
            discards: 0,
        }
    }

    /// Stream trace events describing compiles, expansions and
    /// discards into `sink`.
    pub fn with_trace_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Ticks observed so far, including the current one during a tick.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// How many failed preconditions have been expanded into subtrees.
    pub fn expansions(&self) -> u64 {
        self.expansions
    }

    /// How many times the refinement went stale and was thrown away.
    pub fn discards(&self) -> u64 {
        self.discards
    }

    /// Whether a compiled tree currently exists. `false` before the
    /// first tick and right after a discard.
    pub fn is_compiled(&self) -> bool {
        self.tree.is_some()
    }

    /// Advance the plan by one synchronous tick.
    ///
    /// Errors abort the tick and propagate; the tree is left as it
    /// was, and ticking may simply continue.
    pub fn tick(&mut self, state: &mut S) -> Result<Status, PlanError<S::Error>> {
        self.ticks += 1;
        let tick = self.ticks;

        if self.tree.is_none() {
            self.tree = Some(PlanTree::compile(&self.goal));
            Self::emit(
                &mut self.sink,
                TraceEvent::Compiled {
                    tick,
                    alternatives: self.goal.len(),
                },
            );
        }
        let Some(tree) = self.tree.as_mut() else {
            unreachable!("compiled above");
        };

        let status = tree.tick(state)?;
        if status != Status::Failure {
            return Ok(status);
        }

        match tree.find_failed() {
            None => {
                // An action failed on a refinement that is no longer
                // valid; start over from the goal on the next tick.
                self.tree = None;
                self.discards += 1;
                Self::emit(&mut self.sink, TraceEvent::Discarded { tick });
                Ok(Status::Failure)
            }
            Some(cond) => {
                let ppa = tree.expand(state, cond)?;
                let promotions = tree.resolve(ppa);
                self.expansions += 1;
                Self::emit(
                    &mut self.sink,
                    TraceEvent::Expanded {
                        tick,
                        nodes: tree.node_count(),
                        promotions,
                    },
                );
                Ok(Status::Running)
            }
        }
    }

    fn emit(sink: &mut Option<Box<dyn TraceSink>>, event: TraceEvent) {
        if let Some(sink) = sink.as_mut() {
            sink.emit(event);
        }
    }
}

/// A plan is itself a behavior, so it mounts under any composite.
impl<S: State + 'static> Behavior<S> for Plan<S> {
    fn tick(&mut self, world: &mut S) -> BtResult {
        Plan::tick(self, world).map_err(Into::into)
    }

    fn reset(&mut self) {
        // Drop the refinement; the next tick recompiles from the goal.
        self.tree = None;
    }
}
