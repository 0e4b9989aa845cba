//! Closure-defined edits.

use std::fmt;

use super::action::{Edit, EditResult, Editable};

/// Which way a self-inverse function is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Inverse,
}

type StepFn<T> = Box<dyn FnMut(&mut T) -> EditResult + Send>;
type DirectedFn<T> = Box<dyn FnMut(&mut T, Direction) -> EditResult + Send>;

enum Logic<T> {
    Pair { run: StepFn<T>, inverse: StepFn<T> },
    SelfInverse(DirectedFn<T>),
}

/// An edit whose logic is a pair of closures, or one closure that is its
/// own inverse.
///
/// Self-inverse edits are the usual way to recompute derived state (a
/// parent's progress, a cached index) inside a composite: the same function
/// runs after the data changes and again after it is restored.
pub struct SimpleEdit<T> {
    name: String,
    logic: Logic<T>,
}

impl<T: Editable> SimpleEdit<T> {
    pub fn new(
        name: impl Into<String>,
        run: impl FnMut(&mut T) -> EditResult + Send + 'static,
        inverse: impl FnMut(&mut T) -> EditResult + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            logic: Logic::Pair {
                run: Box::new(run),
                inverse: Box::new(inverse),
            },
        }
    }

    pub fn self_inverse(
        name: impl Into<String>,
        run: impl FnMut(&mut T, Direction) -> EditResult + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            logic: Logic::SelfInverse(Box::new(run)),
        }
    }
}

impl<T: Editable> Edit<T> for SimpleEdit<T> {
    fn apply(&mut self, target: &mut T) -> EditResult {
        match &mut self.logic {
            Logic::Pair { run, .. } => run(target),
            Logic::SelfInverse(run) => run(target, Direction::Forward),
        }
    }

    fn undo(&mut self, target: &mut T) -> EditResult {
        match &mut self.logic {
            Logic::Pair { inverse, .. } => inverse(target),
            Logic::SelfInverse(run) => run(target, Direction::Inverse),
        }
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

impl<T> fmt::Debug for SimpleEdit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.logic {
            Logic::Pair { .. } => "pair",
            Logic::SelfInverse(_) => "self-inverse",
        };
        f.debug_struct("SimpleEdit")
            .field("name", &self.name)
            .field("logic", &kind)
            .finish()
    }
}
