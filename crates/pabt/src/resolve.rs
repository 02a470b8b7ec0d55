use std::collections::VecDeque;

use crate::state::{Condition, Effect, State};
use crate::tree::{NodeId, PlanTree, PpaId};

impl<S: State> PlanTree<S> {
    /// Promote `ppa` leftward until no earlier-executing action's
    /// declared effects falsify its preconditions. Returns the number
    /// of promotions.
    ///
    /// Each promotion places the subtree immediately before the
    /// conflicting PPA under that PPA's parent, then the search
    /// restarts from the new position; under the usual STRIPS
    /// assumptions a quiescent position exists.
    pub fn resolve(&mut self, ppa: PpaId) -> usize {
        let mut moves = 0;
        while let Some(other) = self.conflict(ppa) {
            let other_root = self.ppa(other).root;
            let parent = self
                .node(other_root)
                .parent
                .expect("a conflicting subtree is always someone's child");
            let root = self.ppa(ppa).root;
            self.append(parent, Some(other_root), &[root]);
            moves += 1;
        }
        moves
    }

    /// First PPA scheduled before `ppa` whose actions would undo one of
    /// `ppa`'s preconditions.
    ///
    /// Earlier-executing subtrees are found by walking left among
    /// siblings and, when none remain, jumping up to the enclosing
    /// PPA's root (without re-checking the tree being left). Only
    /// expanded PPA roots are candidates.
    fn conflict(&self, ppa: PpaId) -> Option<PpaId> {
        let mut n = self.ppa(ppa).root;
        loop {
            if let Some(prev) = self.node(n).prev {
                n = prev;
            } else if let Some(enclosing) = self.enclosing_ppa(n) {
                n = self.ppa(enclosing).root;
                continue;
            } else {
                return None;
            }
            let Some(other) = self.ppa_rooted_at(n) else {
                continue;
            };
            if self.conflicts(ppa, other) {
                return Some(other);
            }
        }
    }

    fn enclosing_ppa(&self, n: NodeId) -> Option<PpaId> {
        self.node(self.node(n).parent?).ppa
    }

    fn ppa_rooted_at(&self, n: NodeId) -> Option<PpaId> {
        self.node(n).ppa.filter(|&p| self.ppa(p).root == n)
    }

    /// Whether any action of `other`, or of a PPA nested in `other`'s
    /// action guards, declares an effect that falsifies one of `ppa`'s
    /// action preconditions.
    fn conflicts(&self, ppa: PpaId, other: PpaId) -> bool {
        let mut pairs = Vec::new();
        for &action in &self.ppa(ppa).actions {
            for &group in &self.action(action).or {
                for (key, &cond) in &self.group(group).and {
                    pairs.push((key, cond));
                }
            }
        }
        if pairs.is_empty() {
            // Ungated alternatives cannot be undone.
            return false;
        }

        let mut queue = VecDeque::from([other]);
        while let Some(other) = queue.pop_front() {
            for &action in &self.ppa(other).actions {
                let rec = self.action(action);
                for &(key, cond) in &pairs {
                    if let Some(effect) = rec.effects.get(key) {
                        if !self.cond(cond).condition.matches(&effect.value()) {
                            return true;
                        }
                    }
                }
                // Guards of this action may themselves have been
                // expanded; those subtrees also execute earlier.
                for &group in &rec.or {
                    for &cond in self.group(group).and.values() {
                        let carrier = self.cond(cond).carrier;
                        if let Some(sub) = self.ppa_rooted_at(carrier) {
                            queue.push_back(sub);
                        }
                    }
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::convert::Infallible;

    use pabt_bt::{from_fn, Behavior, Status};

    use crate::state::{Action, Condition, Conditions, Effect, Effects, State};
    use crate::tree::{PlanTree, PpaId};

    /// Integer variables with per-key scripted actions.
    #[derive(Default)]
    struct Board {
        vars: HashMap<&'static str, i64>,
        menu: HashMap<&'static str, Vec<TestAction>>,
    }

    #[derive(Clone)]
    struct Is {
        key: &'static str,
        want: i64,
    }

    #[derive(Clone)]
    struct Becomes {
        key: &'static str,
        value: i64,
    }

    #[derive(Clone)]
    struct TestAction {
        pre: Vec<Is>,
        effects: Vec<Becomes>,
    }

    impl State for Board {
        type Key = &'static str;
        type Value = i64;
        type Condition = Is;
        type Effect = Becomes;
        type Action = TestAction;
        type Error = Infallible;

        fn variable(&self, key: &&'static str) -> Result<i64, Infallible> {
            Ok(self.vars.get(key).copied().unwrap_or(0))
        }

        fn actions(&mut self, failed: &Is) -> Result<Vec<TestAction>, Infallible> {
            Ok(self.menu.get(failed.key).cloned().unwrap_or_default())
        }
    }

    impl Condition<Board> for Is {
        fn key(&self) -> &'static str {
            self.key
        }

        fn matches(&self, value: &i64) -> bool {
            *value == self.want
        }
    }

    impl Effect<Board> for Becomes {
        fn key(&self) -> &'static str {
            self.key
        }

        fn value(&self) -> i64 {
            self.value
        }
    }

    impl Action<Board> for TestAction {
        fn conditions(&self) -> Vec<Conditions<Board>> {
            if self.pre.is_empty() {
                Vec::new()
            } else {
                vec![Conditions::new(self.pre.clone()).unwrap()]
            }
        }

        fn effects(&self) -> Effects<Board> {
            Effects::new(self.effects.clone()).unwrap()
        }

        fn behavior(self) -> Box<dyn Behavior<Board>> {
            let writes = self.effects;
            Box::new(from_fn(move |board: &mut Board| {
                for write in &writes {
                    board.vars.insert(write.key, write.value);
                }
                Ok(Status::Success)
            }))
        }
    }

    fn is(key: &'static str, want: i64) -> Is {
        Is { key, want }
    }

    fn becomes(key: &'static str, value: i64) -> Becomes {
        Becomes { key, value }
    }

    /// Achieving `a` as a side effect clears `p`, which the action for
    /// `b` needs; the `b` subtree must end up left of the `a` subtree.
    fn conflicted_board() -> Board {
        let mut board = Board::default();
        board.menu.insert(
            "a",
            vec![TestAction {
                pre: vec![],
                effects: vec![becomes("a", 1), becomes("p", 0)],
            }],
        );
        board.menu.insert(
            "b",
            vec![TestAction {
                pre: vec![is("p", 1)],
                effects: vec![becomes("b", 1)],
            }],
        );
        board.menu.insert(
            "p",
            vec![TestAction {
                pre: vec![],
                effects: vec![becomes("p", 1)],
            }],
        );
        board
    }

    fn step(tree: &mut PlanTree<Board>, board: &mut Board) -> Option<PpaId> {
        assert_eq!(tree.tick(board).unwrap(), Status::Failure);
        let cond = tree.find_failed()?;
        let ppa = tree.expand(board, cond).unwrap();
        tree.resolve(ppa);
        Some(ppa)
    }

    #[test]
    fn conflicting_subtree_is_promoted_leftward() {
        let mut board = conflicted_board();
        let goal = Conditions::new(vec![is("a", 1), is("b", 1)]).unwrap();
        let mut tree = PlanTree::compile(&[goal]);

        let ppa_a = step(&mut tree, &mut board).expect("expands a");
        // Run the a-action, then fail on b and expand it.
        let ppa_b = step(&mut tree, &mut board).expect("expands b");

        // The b subtree was promoted before the a subtree.
        let order = tree.children(tree.root);
        assert_eq!(order[0], tree.ppa(ppa_b).root);
        assert_eq!(order[1], tree.ppa(ppa_a).root);

        // Quiescent: nothing earlier falsifies b's preconditions now.
        assert!(tree.conflict(ppa_b).is_none());
    }

    #[test]
    fn resolution_descends_into_nested_guards() {
        let mut board = conflicted_board();
        let goal = Conditions::new(vec![is("a", 1), is("b", 1)]).unwrap();
        let mut tree = PlanTree::compile(&[goal]);

        let ppa_a = step(&mut tree, &mut board).expect("expands a");
        let _ppa_b = step(&mut tree, &mut board).expect("expands b");
        let ppa_p = step(&mut tree, &mut board).expect("expands p inside b's guard");

        // The p expansion lives inside b's guard and stays there.
        assert!(tree.conflict(ppa_p).is_none());

        // From a's perspective the b subtree now includes a nested PPA;
        // the descent still finds no contradiction with a's (empty)
        // preconditions.
        assert!(tree.conflict(ppa_a).is_none());

        // Everything executes in the promoted order.
        assert_eq!(tree.tick(&mut board).unwrap(), Status::Success);
        assert_eq!(board.vars["a"], 1);
        assert_eq!(board.vars["b"], 1);
        assert_eq!(board.vars["p"], 1);
    }

    #[test]
    fn no_conflict_without_overlapping_keys() {
        let mut board = Board::default();
        board.menu.insert(
            "a",
            vec![TestAction {
                pre: vec![],
                effects: vec![becomes("a", 1)],
            }],
        );
        board.menu.insert(
            "b",
            vec![TestAction {
                pre: vec![is("q", 0)],
                effects: vec![becomes("b", 1)],
            }],
        );
        let goal = Conditions::new(vec![is("a", 1), is("b", 1)]).unwrap();
        let mut tree = PlanTree::compile(&[goal]);

        let ppa_a = step(&mut tree, &mut board).expect("expands a");
        let ppa_b = step(&mut tree, &mut board).expect("expands b");

        // Disjoint keys: no promotion, original order kept.
        let order = tree.children(tree.root);
        assert_eq!(order[0], tree.ppa(ppa_a).root);
        assert_eq!(order[1], tree.ppa(ppa_b).root);
    }
}
