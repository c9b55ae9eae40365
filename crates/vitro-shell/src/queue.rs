//! Main-thread task funnel.

use parking_lot::Mutex;

type Task = Box<dyn FnOnce() + Send>;

/// Closures queued from arbitrary threads, drained on the event-loop thread.
#[derive(Default)]
pub(crate) struct TaskQueue {
    tasks: Mutex<Vec<Task>>,
}

impl TaskQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, task: Task) {
        self.tasks.lock().push(task);
    }

    /// Runs every queued task in submission order.
    ///
    /// The backlog is swapped out before running so tasks queued by a
    /// running task land in the next drain instead of deadlocking on the
    /// queue lock.
    pub(crate) fn drain(&self) -> usize {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}
