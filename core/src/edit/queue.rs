//! Thread-safe queue for edits submitted from read-only contexts.
//!
//! Callbacks and views only see `&T`, so they cannot run edits themselves.
//! They push follow-up edits onto an [`EditQueue`] instead, and the owner of
//! the [`EditLog`](super::EditLog) runs them once the current operation has
//! finished.

use std::fmt;

use parking_lot::Mutex;

use super::action::{EditResult, Editable};
use super::base::BaseEdit;
use super::history::EditLog;

/// A queue of pending edits. [`push`](Self::push) only needs `&self`.
///
/// # Example
///
/// ```ignore
/// let queue = Arc::new(EditQueue::new());
/// let sink = Arc::clone(&queue);
/// log.callbacks_mut().register::<AttributeEdit<Planner>, _>(PostRun, "audit", move |planner, _| {
///     sink.push(BaseEdit::new(audit_orphans(planner)));
/// })?;
///
/// log.run(rename_task(&planner, id, "Groceries")?, &mut planner)?;
/// queue.run_all(&mut log, &mut planner)?;
/// ```
pub struct EditQueue<T: Editable> {
    queue: Mutex<Vec<BaseEdit<T>>>,
}

impl<T: Editable> EditQueue<T> {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, edit: BaseEdit<T>) {
        self.queue.lock().push(edit);
    }

    /// Drains all queued edits, returning them in submission order.
    pub fn drain(&self) -> Vec<BaseEdit<T>> {
        std::mem::take(&mut *self.queue.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Runs queued edits through `log` until the queue is empty, including
    /// edits queued by callbacks of the edits being run. Returns how many
    /// were valid.
    pub fn run_all(&self, log: &mut EditLog<T>, target: &mut T) -> EditResult<usize> {
        let mut valid = 0;
        loop {
            let batch = self.drain();
            if batch.is_empty() {
                return Ok(valid);
            }
            for edit in batch {
                if log.run(edit, target)? {
                    valid += 1;
                }
            }
        }
    }
}

impl<T: Editable> Default for EditQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Editable> fmt::Debug for EditQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditQueue")
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::edit::{CallbackPhase, Edit, SimpleEdit};

    struct Counter {
        value: i32,
        echoes: i32,
    }

    impl Editable for Counter {}

    #[derive(Debug)]
    struct Add {
        amount: i32,
    }

    impl Edit<Counter> for Add {
        fn apply(&mut self, target: &mut Counter) -> EditResult {
            target.value += self.amount;
            Ok(())
        }

        fn undo(&mut self, target: &mut Counter) -> EditResult {
            target.value -= self.amount;
            Ok(())
        }

        fn is_valid(&self) -> bool {
            self.amount != 0
        }

        fn name(&self) -> String {
            "Add".into()
        }
    }

    fn add(amount: i32) -> BaseEdit<Counter> {
        BaseEdit::new(Add { amount })
    }

    #[test]
    fn push_and_drain_preserve_order() {
        let queue = EditQueue::<Counter>::new();
        queue.push(add(10));
        queue.push(add(20));
        assert_eq!(queue.len(), 2);

        let mut counter = Counter { value: 0, echoes: 0 };
        for mut edit in queue.drain() {
            edit.run(&mut counter).unwrap();
        }
        assert_eq!(counter.value, 30);
        assert!(queue.is_empty());
    }

    #[test]
    fn run_all_records_through_log() {
        let queue = EditQueue::new();
        queue.push(add(1));
        queue.push(add(0));
        queue.push(add(2));

        let mut log = EditLog::default();
        let mut counter = Counter { value: 0, echoes: 0 };
        assert_eq!(queue.run_all(&mut log, &mut counter).unwrap(), 2);
        assert_eq!(counter.value, 3);
        assert_eq!(log.undo_count(), 2);
    }

    #[test]
    fn callbacks_can_queue_follow_ups() {
        let queue = Arc::new(EditQueue::new());
        let mut log = EditLog::default();
        let sink = Arc::clone(&queue);
        log.callbacks_mut()
            .register::<Add, _>(CallbackPhase::PostRun, "echo", move |_, edit| {
                let amount = edit.amount;
                sink.push(BaseEdit::unregistered(SimpleEdit::new(
                    "Echo",
                    move |c: &mut Counter| {
                        c.echoes += amount;
                        Ok(())
                    },
                    move |c: &mut Counter| {
                        c.echoes -= amount;
                        Ok(())
                    },
                )));
            })
            .unwrap();

        let mut counter = Counter { value: 0, echoes: 0 };
        log.run(add(5), &mut counter).unwrap();
        assert_eq!(queue.len(), 1);
        queue.run_all(&mut log, &mut counter).unwrap();
        assert_eq!(counter.echoes, 5);
        assert_eq!(log.undo_count(), 1);
    }

    #[test]
    fn debug_impl() {
        let queue = EditQueue::<Counter>::new();
        queue.push(add(1));
        assert_eq!(format!("{queue:?}"), "EditQueue { pending: 1 }");
    }
}
