use crate::{Behavior, BtResult, Status};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The composite kinds the planner relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Composite {
    /// AND: ticks children left to right, stopping at the first
    /// non-`Success` child.
    Sequence,
    /// OR: ticks children left to right, stopping at the first
    /// non-`Failure` child.
    Selector,
    /// Selector that resumes from the last `Running` child across
    /// ticks instead of re-evaluating from the left.
    Memorize,
}

impl Composite {
    /// Construct the matching composite node over an ordered child list.
    pub fn build<W: 'static>(self, children: Vec<Box<dyn Behavior<W>>>) -> Box<dyn Behavior<W>> {
        match self {
            Composite::Sequence => Box::new(Sequence::new(children)),
            Composite::Selector => Box::new(Selector::new(children)),
            Composite::Memorize => Box::new(MemorizeSelector::new(children)),
        }
    }
}

pub struct Sequence<W> {
    children: Vec<Box<dyn Behavior<W>>>,
}

impl<W> Sequence<W> {
    pub fn new(children: Vec<Box<dyn Behavior<W>>>) -> Self {
        Self { children }
    }
}

impl<W> Behavior<W> for Sequence<W> {
    fn tick(&mut self, world: &mut W) -> BtResult {
        for child in self.children.iter_mut() {
            match child.tick(world)? {
                Status::Success => continue,
                status => return Ok(status),
            }
        }
        Ok(Status::Success)
    }

    fn reset(&mut self) {
        for child in self.children.iter_mut() {
            child.reset();
        }
    }
}

pub struct Selector<W> {
    children: Vec<Box<dyn Behavior<W>>>,
}

impl<W> Selector<W> {
    pub fn new(children: Vec<Box<dyn Behavior<W>>>) -> Self {
        Self { children }
    }
}

impl<W> Behavior<W> for Selector<W> {
    fn tick(&mut self, world: &mut W) -> BtResult {
        for child in self.children.iter_mut() {
            match child.tick(world)? {
                Status::Failure => continue,
                status => return Ok(status),
            }
        }
        Ok(Status::Failure)
    }

    fn reset(&mut self) {
        for child in self.children.iter_mut() {
            child.reset();
        }
    }
}

/// Selector with memory: once a child reports `Running`, later ticks
/// start from that child, skipping its earlier siblings entirely.
pub struct MemorizeSelector<W> {
    children: Vec<Box<dyn Behavior<W>>>,
    resume: usize,
}

impl<W> MemorizeSelector<W> {
    pub fn new(children: Vec<Box<dyn Behavior<W>>>) -> Self {
        Self {
            children,
            resume: 0,
        }
    }
}

impl<W> Behavior<W> for MemorizeSelector<W> {
    fn tick(&mut self, world: &mut W) -> BtResult {
        let start = if self.resume < self.children.len() {
            self.resume
        } else {
            0
        };
        for index in start..self.children.len() {
            match self.children[index].tick(world)? {
                Status::Failure => continue,
                Status::Running => {
                    self.resume = index;
                    return Ok(Status::Running);
                }
                Status::Success => {
                    self.reset();
                    return Ok(Status::Success);
                }
            }
        }
        self.reset();
        Ok(Status::Failure)
    }

    fn reset(&mut self) {
        self.resume = 0;
        for child in self.children.iter_mut() {
            child.reset();
        }
    }
}
