//! In-memory owner of every booking task and the page bound to it.
//!
//! All mutation of the collection goes through here. The lock is a plain
//! `parking_lot` mutex and is never held across an `.await`; page I/O
//! happens after the entry has been copied out.

use std::sync::Arc;

use adapters::{BrowserEngine, PageHandle};
use corelib::{BookingTask, TaskId, TaskStatus};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

const NOTIFY_CAPACITY: usize = 64;

struct TaskEntry {
    task: BookingTask,
    page: PageHandle,
}

pub struct TaskRegistry {
    engine: Arc<dyn BrowserEngine>,
    tasks: Mutex<Vec<TaskEntry>>,
    notify_tx: broadcast::Sender<Vec<BookingTask>>,
}

impl TaskRegistry {
    pub fn new(engine: Arc<dyn BrowserEngine>) -> Self {
        let (notify_tx, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            engine,
            tasks: Mutex::new(Vec::new()),
            notify_tx,
        }
    }

    /// Open a dedicated page for `task` and register it.
    ///
    /// Returns `None` when the browser could not open a page.
    #[instrument(skip(self, task), fields(task_id = %task.id))]
    pub async fn create(&self, task: BookingTask) -> Option<TaskId> {
        let page = match self.engine.new_page().await {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "could not open a page for task");
                return None;
            }
        };

        let id = task.id;
        self.tasks.lock().push(TaskEntry { task, page });
        info!("task created");

        self.notify();
        Some(id)
    }

    /// Overwrite target and progress fields of the stored task with `task`'s.
    /// Observers are not notified.
    #[instrument(skip(self, task), fields(task_id = %task.id))]
    pub fn update(&self, task: &BookingTask) {
        let mut tasks = self.tasks.lock();
        let Some(entry) = tasks.iter_mut().find(|e| e.task.id == task.id) else {
            debug!("update for unknown task ignored");
            return;
        };

        let t = &mut entry.task;
        t.space_no = task.space_no.clone();
        t.date = task.date;
        t.time = task.time.clone();
        t.attempts = task.attempts;
        t.status = task.status;
        t.log = task.log.clone();
    }

    /// Close the task's page and forget it. Unknown ids are ignored.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: TaskId) {
        let removed = {
            let mut tasks = self.tasks.lock();
            tasks
                .iter()
                .position(|e| e.task.id == id)
                .map(|idx| tasks.remove(idx))
        };

        let Some(entry) = removed else {
            debug!("delete for unknown task ignored");
            return;
        };

        if let Err(e) = entry.page.close().await {
            warn!(error = %e, "task page did not close cleanly");
        }
        info!("task deleted");

        self.notify();
    }

    /// Request cancellation. Only a running task is affected; the retry
    /// loop observes it at the top of its next iteration.
    #[instrument(skip(self))]
    pub fn stop(&self, id: TaskId) {
        let stopped = self.modify(id, |t| {
            if t.status == TaskStatus::Running {
                t.status = TaskStatus::Stopped;
                true
            } else {
                false
            }
        });

        if stopped == Some(true) {
            info!("stop requested");
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get(&self, id: TaskId) -> Option<BookingTask> {
        self.tasks
            .lock()
            .iter()
            .find(|e| e.task.id == id)
            .map(|e| e.task.clone())
    }

    pub fn page(&self, id: TaskId) -> Option<PageHandle> {
        self.tasks
            .lock()
            .iter()
            .find(|e| e.task.id == id)
            .map(|e| Arc::clone(&e.page))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn list(&self) -> Vec<BookingTask> {
        self.tasks.lock().iter().map(|e| e.task.clone()).collect()
    }

    /// Apply `f` to the stored task in place. `None` if the id is unknown.
    pub fn modify<R>(&self, id: TaskId, f: impl FnOnce(&mut BookingTask) -> R) -> Option<R> {
        self.tasks
            .lock()
            .iter_mut()
            .find(|e| e.task.id == id)
            .map(|e| f(&mut e.task))
    }

    /// Receive a full snapshot of the collection after every change.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<BookingTask>> {
        self.notify_tx.subscribe()
    }

    pub fn notify(&self) {
        // No receivers is not an error.
        let _ = self.notify_tx.send(self.list());
    }
}
