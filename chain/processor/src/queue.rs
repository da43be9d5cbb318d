use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, MutexGuard};

use crate::error::ProcessorError;

/// Spec §4.9's single-writer job queue, reduced to its one real guarantee:
/// at most one block/transaction job runs at a time, FIFO. `tokio::sync::Mutex`
/// already gives FIFO-fair async waiters, so a bounded mailbox plus a
/// dedicated worker task would just reimplement it with extra indirection
/// and `Box<dyn Any>` type erasure for the return value. A zero-sized permit
/// behind the mutex is the same guarantee without either.
pub struct JobQueue {
    permit: Mutex<()>,
    shutting_down: AtomicBool,
}

impl Default for JobQueue {
    fn default() -> Self {
        JobQueue { permit: Mutex::new(()), shutting_down: AtomicBool::new(false) }
    }
}

impl JobQueue {
    pub fn new() -> Self {
        JobQueue::default()
    }

    pub async fn acquire(&self) -> Result<MutexGuard<'_, ()>, ProcessorError> {
        if self.shutting_down.load(Ordering::Acquire) {
            return Err(ProcessorError::ShuttingDown);
        }
        Ok(self.permit.lock().await)
    }

    pub fn stop(&self) {
        self.shutting_down.store(true, Ordering::Release);
    }
}
