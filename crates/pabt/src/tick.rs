use pabt_bt::{Composite, Status};

use crate::error::PlanError;
use crate::state::{Condition, State};
use crate::tree::{CondId, NodeId, Payload, PlanTree};

impl<S: State> PlanTree<S> {
    /// Tick the whole tree against `state`.
    pub fn tick(&mut self, state: &mut S) -> Result<Status, PlanError<S::Error>> {
        self.tick_node(state, self.root)
    }

    fn tick_node(&mut self, state: &mut S, id: NodeId) -> Result<Status, PlanError<S::Error>> {
        if let Some(kind) = self.node(id).composite() {
            return self.tick_group(state, id, kind);
        }
        if let Some(cond) = self.node(id).check() {
            return self.tick_check(state, cond);
        }
        let Payload::Leaf(behavior) = &mut self.node_mut(id).payload else {
            unreachable!("non-group, non-check node must be a behavior leaf");
        };
        behavior.tick(state).map_err(PlanError::Leaf)
    }

    /// Evaluate one condition check and record the outcome on its
    /// precondition record. A failed variable read counts as a failed
    /// check and still propagates the error.
    fn tick_check(&mut self, state: &S, cond: CondId) -> Result<Status, PlanError<S::Error>> {
        let key = self.cond(cond).condition.key();
        match state.variable(&key) {
            Ok(value) => {
                let status = if self.cond(cond).condition.matches(&value) {
                    Status::Success
                } else {
                    Status::Failure
                };
                self.cond_mut(cond).status = Some(status);
                Ok(status)
            }
            Err(err) => {
                self.cond_mut(cond).status = Some(Status::Failure);
                Err(PlanError::State(err))
            }
        }
    }

    fn tick_group(
        &mut self,
        state: &mut S,
        id: NodeId,
        kind: Composite,
    ) -> Result<Status, PlanError<S::Error>> {
        let children = self.children(id);
        match kind {
            Composite::Sequence => {
                for child in children {
                    match self.tick_node(state, child)? {
                        Status::Success => continue,
                        status => return Ok(status),
                    }
                }
                Ok(Status::Success)
            }
            Composite::Selector => {
                for child in children {
                    match self.tick_node(state, child)? {
                        Status::Failure => continue,
                        status => return Ok(status),
                    }
                }
                Ok(Status::Failure)
            }
            Composite::Memorize => {
                let start = {
                    let memory = self.node(id).memory;
                    if memory < children.len() {
                        memory
                    } else {
                        0
                    }
                };
                for (index, &child) in children.iter().enumerate().skip(start) {
                    match self.tick_node(state, child)? {
                        Status::Failure => continue,
                        Status::Running => {
                            self.node_mut(id).memory = index;
                            return Ok(Status::Running);
                        }
                        Status::Success => {
                            self.node_mut(id).memory = 0;
                            return Ok(Status::Success);
                        }
                    }
                }
                self.node_mut(id).memory = 0;
                Ok(Status::Failure)
            }
        }
    }
}
