use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

/// A unit of deferred work. It reports nothing back to whoever scheduled it.
pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// "Run this after `delay`, independently of the caller."
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task);
}

/// Spawns each task onto the current tokio runtime after sleeping for its delay.
///
/// Must be used from within a runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            task.await;
        });
    }
}

/// Holds tasks until they are driven explicitly with [`ManualScheduler::run_pending`].
///
/// Delays are ignored; tasks run in submission order. Useful wherever the exact
/// moment an execution attempt happens must be controlled.
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<VecDeque<Task>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.lock_queue().len()
    }

    /// Runs every queued task to completion, including any scheduled while running.
    /// Returns how many ran.
    pub async fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // The queue lock is released before the task is awaited.
            let next = self.lock_queue().pop_front();
            let Some(task) = next else {
                return ran;
            };
            task.await;
            ran += 1;
        }
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<Task>> {
        // A panicking task never holds this lock, so a poisoned queue is still consistent.
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, _delay: Duration, task: Task) {
        self.lock_queue().push_back(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(counter: &Arc<AtomicUsize>) -> Task {
        let counter = Arc::clone(counter);
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn manual_scheduler_runs_only_when_driven() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        scheduler.schedule(Duration::from_secs(60), counting_task(&counter));
        scheduler.schedule(Duration::ZERO, counting_task(&counter));
        assert_eq!(scheduler.pending(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        assert_eq!(scheduler.run_pending().await, 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_waits_for_the_delay() {
        let counter = Arc::new(AtomicUsize::new(0));
        TokioScheduler.schedule(Duration::from_millis(500), counting_task(&counter));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
