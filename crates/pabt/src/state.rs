use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use pabt_bt::Behavior;

use crate::error::{ConditionsError, EffectsError};

/// The mutable world the planner drives.
///
/// A state exposes named variables to read, and templates the actions
/// able to resolve a specific failed condition. Everything else about
/// the world stays behind this trait.
pub trait State: Sized {
    /// Uniquely identifies a state variable.
    type Key: Clone + Eq + Hash + fmt::Debug;
    /// Observed (and asserted) variable values.
    type Value;
    type Condition: Condition<Self> + Clone;
    type Effect: Effect<Self>;
    type Action: Action<Self>;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Current value of the variable identified by `key`.
    fn variable(&self, key: &Self::Key) -> Result<Self::Value, Self::Error>;

    /// All viable actions for achieving `failed`. The condition is
    /// passed as-is, so implementations may template actions per
    /// failure. Returning no actions is not an error; the planner
    /// simply has nothing to expand with.
    fn actions(&mut self, failed: &Self::Condition) -> Result<Vec<Self::Action>, Self::Error>;
}

/// A constraint on a single state variable.
pub trait Condition<S: State> {
    fn key(&self) -> S::Key;
    /// Whether `value` satisfies the constraint.
    fn matches(&self, value: &S::Value) -> bool;
}

/// An action's asserted post-state value for one variable.
///
/// Declarative only: executing the action does not guarantee the
/// variable actually takes this value.
pub trait Effect<S: State> {
    fn key(&self) -> S::Key;
    fn value(&self) -> S::Value;
}

/// A templated action able to achieve one or more effects.
pub trait Action<S: State> {
    /// Disjunction of precondition conjunctions. At least one must
    /// hold before the behavior runs; empty means ungated.
    fn conditions(&self) -> Vec<Conditions<S>>;

    /// The declared post-state changes. Every effect on the relevant
    /// state space must be declared here; undeclared side effects are
    /// invisible to conflict detection.
    fn effects(&self) -> Effects<S>;

    /// The behavior executed once a precondition conjunction holds.
    fn behavior(self) -> Box<dyn Behavior<S>>;
}

/// A conjunction of conditions over distinct variables.
///
/// Key uniqueness is enforced here, at construction, so the rest of
/// the planner can assume well-formed conjunctions.
pub struct Conditions<S: State> {
    items: Vec<S::Condition>,
}

impl<S: State> Conditions<S> {
    /// Validates that the conjunction is non-empty and that no two
    /// conditions constrain the same variable.
    pub fn new(items: Vec<S::Condition>) -> Result<Self, ConditionsError> {
        if items.is_empty() {
            return Err(ConditionsError::Empty);
        }
        let mut seen = HashSet::with_capacity(items.len());
        for condition in &items {
            let key = condition.key();
            if !seen.insert(key.clone()) {
                return Err(ConditionsError::DuplicateKey(format!("{key:?}")));
            }
        }
        Ok(Self { items })
    }

    /// A conjunction of exactly one condition.
    pub fn single(condition: S::Condition) -> Self {
        Self {
            items: vec![condition],
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S::Condition> {
        self.items.iter()
    }
}

impl<S: State> Clone for Conditions<S> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<S: State> fmt::Debug for Conditions<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.items.iter().map(|c| c.key()))
            .finish()
    }
}

/// An action's declared effects, keyed by variable.
pub struct Effects<S: State> {
    map: HashMap<S::Key, S::Effect>,
}

impl<S: State> Effects<S> {
    /// Validates that no two effects target the same variable.
    pub fn new(items: Vec<S::Effect>) -> Result<Self, EffectsError> {
        let mut map = HashMap::with_capacity(items.len());
        for effect in items {
            let key = effect.key();
            if map.contains_key(&key) {
                return Err(EffectsError::DuplicateKey(format!("{key:?}")));
            }
            map.insert(key, effect);
        }
        Ok(Self { map })
    }

    /// A set of exactly one effect.
    pub fn single(effect: S::Effect) -> Self {
        let mut map = HashMap::with_capacity(1);
        map.insert(effect.key(), effect);
        Self { map }
    }

    pub fn get(&self, key: &S::Key) -> Option<&S::Effect> {
        self.map.get(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<S: State> fmt::Debug for Effects<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.map.keys()).finish()
    }
}
