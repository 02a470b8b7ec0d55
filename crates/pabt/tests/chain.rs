use std::sync::mpsc;

use pabt::{
    Action, Condition, Conditions, Effect, Effects, Plan, PlanError, State, Status, TraceEvent,
};
use pabt_bt::{from_fn, Behavior};
use thiserror::Error;

/// A single integer variable `x`, stepped one unit at a time: the
/// action for reaching `n` requires `x == n - 1`.
struct Counter {
    x: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
enum CounterError {
    #[error("unknown variable: {0}")]
    Unknown(String),
}

#[derive(Clone)]
struct VarIs {
    key: &'static str,
    want: i64,
}

struct VarBecomes(i64);

struct StepTo(i64);

impl State for Counter {
    type Key = &'static str;
    type Value = i64;
    type Condition = VarIs;
    type Effect = VarBecomes;
    type Action = StepTo;
    type Error = CounterError;

    fn variable(&self, key: &&'static str) -> Result<i64, CounterError> {
        match *key {
            "x" => Ok(self.x),
            other => Err(CounterError::Unknown(other.to_owned())),
        }
    }

    fn actions(&mut self, failed: &VarIs) -> Result<Vec<StepTo>, CounterError> {
        if failed.key == "x" {
            Ok(vec![StepTo(failed.want)])
        } else {
            Ok(Vec::new())
        }
    }
}

impl Condition<Counter> for VarIs {
    fn key(&self) -> &'static str {
        self.key
    }

    fn matches(&self, value: &i64) -> bool {
        *value == self.want
    }
}

impl Effect<Counter> for VarBecomes {
    fn key(&self) -> &'static str {
        "x"
    }

    fn value(&self) -> i64 {
        self.0
    }
}

impl Action<Counter> for StepTo {
    fn conditions(&self) -> Vec<Conditions<Counter>> {
        vec![Conditions::single(VarIs {
            key: "x",
            want: self.0 - 1,
        })]
    }

    fn effects(&self) -> Effects<Counter> {
        Effects::single(VarBecomes(self.0))
    }

    fn behavior(self) -> Box<dyn Behavior<Counter>> {
        let target = self.0;
        Box::new(from_fn(move |counter: &mut Counter| {
            if counter.x == target - 1 {
                counter.x = target;
                Ok(Status::Success)
            } else {
                Ok(Status::Failure)
            }
        }))
    }
}

fn x_is(want: i64) -> Vec<Conditions<Counter>> {
    vec![Conditions::single(VarIs { key: "x", want })]
}

#[test]
fn empty_goal_succeeds_immediately() {
    let mut counter = Counter { x: 0 };
    let mut plan = Plan::new(Vec::new());
    assert_eq!(plan.tick(&mut counter).unwrap(), Status::Success);
    assert_eq!(plan.expansions(), 0);
}

#[test]
fn satisfied_goal_needs_no_expansion() {
    let mut counter = Counter { x: 2 };
    let mut plan = Plan::new(x_is(2));
    assert_eq!(plan.tick(&mut counter).unwrap(), Status::Success);
    assert_eq!(plan.tick(&mut counter).unwrap(), Status::Success);
    assert_eq!(plan.expansions(), 0);
    assert_eq!(counter.x, 2);
}

#[test]
fn two_step_chain_expands_then_executes() {
    let (sender, receiver) = mpsc::channel();
    let mut counter = Counter { x: 0 };
    let mut plan = Plan::new(x_is(2)).with_trace_sink(sender);

    // First tick plans x: 1 -> 2, second plans the nested x: 0 -> 1,
    // third runs both steps and reaches the goal.
    assert_eq!(plan.tick(&mut counter).unwrap(), Status::Running);
    assert_eq!(plan.tick(&mut counter).unwrap(), Status::Running);
    assert_eq!(plan.tick(&mut counter).unwrap(), Status::Success);
    assert_eq!(counter.x, 2);
    assert_eq!(plan.expansions(), 2);

    // Idempotent at the goal.
    assert_eq!(plan.tick(&mut counter).unwrap(), Status::Success);
    assert_eq!(plan.expansions(), 2);

    let events: Vec<TraceEvent> = receiver.try_iter().collect();
    assert!(matches!(
        events.as_slice(),
        [
            TraceEvent::Compiled {
                tick: 1,
                alternatives: 1,
            },
            TraceEvent::Expanded {
                tick: 1,
                promotions: 0,
                ..
            },
            TraceEvent::Expanded {
                tick: 2,
                promotions: 0,
                ..
            },
        ]
    ));
}

#[test]
fn read_errors_propagate_through_the_tick() {
    let mut counter = Counter { x: 0 };
    let mut plan = Plan::new(vec![Conditions::single(VarIs { key: "y", want: 1 })]);
    match plan.tick(&mut counter).unwrap_err() {
        PlanError::State(err) => assert_eq!(err, CounterError::Unknown("y".to_owned())),
        other => panic!("unexpected error: {other}"),
    }
    // The plan survives the error and keeps reporting it.
    assert!(plan.tick(&mut counter).is_err());
}
