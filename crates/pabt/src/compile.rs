use pabt_bt::Composite;

use crate::state::{Condition, Conditions, State};
use crate::tree::{CondRec, GroupId, NodeId, Payload, PlanTree};

impl<S: State> PlanTree<S> {
    /// Compile a goal into a fresh tree.
    ///
    /// A single conjunction becomes a Sequence of condition checks; a
    /// disjunction becomes a Selector over one Sequence per
    /// alternative; an empty goal is an empty Sequence, which succeeds
    /// immediately.
    pub fn compile(goal: &[Conditions<S>]) -> Self {
        let mut tree = Self::with_root(Payload::Group(Composite::Sequence));
        let root = tree.root;
        tree.generate_or(root, goal);
        tree
    }

    /// Lower a disjunction of conjunctions into `target`, returning one
    /// precondition group per alternative. Children inherit `target`'s
    /// role back-references.
    pub(crate) fn generate_or(&mut self, target: NodeId, or: &[Conditions<S>]) -> Vec<GroupId> {
        match or {
            [] => {
                self.node_mut(target).payload = Payload::Group(Composite::Sequence);
                Vec::new()
            }
            [conditions] => {
                let group = self.push_group(target);
                self.node_mut(target).group = Some(group);
                self.generate_and(group, conditions);
                vec![group]
            }
            _ => {
                self.node_mut(target).payload = Payload::Group(Composite::Selector);
                let ppa = self.node(target).ppa;
                let action = self.node(target).action;
                let mut groups = Vec::with_capacity(or.len());
                for conditions in or {
                    let child = self.alloc(Payload::Group(Composite::Sequence));
                    {
                        let node = self.node_mut(child);
                        node.ppa = ppa;
                        node.action = action;
                    }
                    let group = self.push_group(child);
                    self.node_mut(child).group = Some(group);
                    self.append(target, None, &[child]);
                    self.generate_and(group, conditions);
                    groups.push(group);
                }
                groups
            }
        }
    }

    /// Lower one conjunction into `group`'s root node: a Sequence of
    /// one condition check per variable, registered in the group's
    /// keyed map.
    pub(crate) fn generate_and(&mut self, group: GroupId, conditions: &Conditions<S>) {
        let target = self.group(group).root;
        self.node_mut(target).payload = Payload::Group(Composite::Sequence);
        let ppa = self.node(target).ppa;
        let action = self.node(target).action;
        for condition in conditions.iter() {
            let key = condition.key();
            let cond = self.next_cond_id();
            let node = self.alloc(Payload::Check(cond));
            {
                let n = self.node_mut(node);
                n.ppa = ppa;
                n.action = action;
                n.group = Some(group);
                n.pre = Some(cond);
            }
            self.push_cond(CondRec {
                carrier: node,
                condition: condition.clone(),
                status: None,
            });
            self.append(target, None, &[node]);
            self.group_mut(group).and.insert(key, cond);
        }
    }
}
