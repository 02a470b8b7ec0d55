use std::collections::VecDeque;

use pabt_bt::{Composite, Status};

use crate::error::PlanError;
use crate::state::{Action, Condition, Effect, State};
use crate::tree::{ActionRec, CondId, Payload, PlanTree, PpaId};

impl<S: State> PlanTree<S> {
    /// Breadth-first search for a failed precondition that has not yet
    /// been expanded in place.
    ///
    /// `None` means the failure came from an action whose refinement is
    /// no longer valid; the caller responds by discarding the plan.
    pub fn find_failed(&self) -> Option<CondId> {
        let mut queue = VecDeque::from([self.root]);
        while let Some(id) = queue.pop_front() {
            if let Some(cond) = self.node(id).pre {
                let rec = self.cond(cond);
                if rec.status == Some(Status::Failure) && self.node(rec.carrier).pre == Some(cond)
                {
                    return Some(cond);
                }
            }
            let mut child = self.node(id).first;
            while let Some(c) = child {
                queue.push_back(c);
                child = self.node(c).next;
            }
        }
        None
    }

    /// Expand a failed precondition into a PPA subtree.
    ///
    /// The carrier node is rewritten in place into the PPA's Selector,
    /// keeping its position under the enclosing Sequence; the original
    /// condition check survives as the Selector's first child, so the
    /// whole subtree short-circuits once the condition holds.
    pub fn expand(&mut self, state: &mut S, cond: CondId) -> Result<PpaId, PlanError<S::Error>> {
        let acts = state
            .actions(&self.cond(cond).condition)
            .map_err(PlanError::State)?;

        let carrier = self.cond(cond).carrier;

        // Stash the original check, payload and roles, as the post node.
        let post = self.alloc(Payload::Group(Composite::Sequence));
        let payload = std::mem::replace(
            &mut self.node_mut(carrier).payload,
            Payload::Group(Composite::Selector),
        );
        let (ppa0, action0, group0, pre0) = {
            let n = self.node(carrier);
            (n.ppa, n.action, n.group, n.pre)
        };
        {
            let n = self.node_mut(post);
            n.payload = payload;
            n.ppa = ppa0;
            n.action = action0;
            n.group = group0;
            n.pre = pre0;
        }

        let ppa = self.push_ppa(carrier, post);
        {
            let n = self.node_mut(carrier);
            n.ppa = Some(ppa);
            n.action = None;
            n.group = None;
            n.pre = None;
            n.memory = 0;
        }
        let post_check = self.ppa(ppa).post;
        self.append(carrier, None, &[post_check]);

        for act in acts {
            self.generate_action(ppa, cond, act);
        }

        // How the alternatives are wired depends on how many qualified.
        let alternatives = self.ppa(ppa).actions.clone();
        match alternatives.as_slice() {
            [] => {}
            [action] => {
                let root = self.action(*action).root;
                self.append(carrier, None, &[root]);
            }
            _ => {
                let wrapper = self.alloc(Payload::Group(Composite::Memorize));
                self.node_mut(wrapper).ppa = Some(ppa);
                for &action in &alternatives {
                    let root = self.action(action).root;
                    self.append(wrapper, None, &[root]);
                }
                self.append(carrier, None, &[wrapper]);
            }
        }
        Ok(ppa)
    }

    /// Build one action alternative under `ppa`, if it qualifies: some
    /// declared effect must satisfy the failed condition. Actions with
    /// no declared effects or no relevant effect are silently skipped.
    fn generate_action(&mut self, ppa: PpaId, failed: CondId, act: S::Action) {
        let effects = act.effects();
        if effects.is_empty() {
            return;
        }
        let qualifies = {
            let condition = &self.cond(failed).condition;
            effects
                .get(&condition.key())
                .map(|effect| condition.matches(&effect.value()))
                .unwrap_or(false)
        };
        if !qualifies {
            return;
        }

        let or = act.conditions();
        let behavior = act.behavior();
        let action = self.next_action_id();

        let leaf = self.alloc(Payload::Leaf(behavior));
        {
            let n = self.node_mut(leaf);
            n.ppa = Some(ppa);
            n.action = Some(action);
        }

        // The condition guard doubles as the action root unless the
        // guard is a Selector over several conjunctions, which needs an
        // outer Sequence to keep "conditions first, then act".
        let mut root = self.alloc(Payload::Group(Composite::Sequence));
        {
            let n = self.node_mut(root);
            n.ppa = Some(ppa);
            n.action = Some(action);
        }
        let groups = self.generate_or(root, &or);
        if groups.len() > 1 {
            let outer = self.alloc(Payload::Group(Composite::Sequence));
            {
                let n = self.node_mut(outer);
                n.ppa = Some(ppa);
                n.action = Some(action);
            }
            self.append(outer, None, &[root]);
            root = outer;
        }
        self.push_action(ActionRec {
            root,
            leaf,
            effects,
            or: groups,
        });
        let behavior_leaf = self.action(action).leaf;
        self.append(root, None, &[behavior_leaf]);
        self.ppa_mut(ppa).actions.push(action);
    }
}
