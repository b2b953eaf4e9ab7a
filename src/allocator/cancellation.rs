use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cooperative, cross-thread cancellation flag.
///
/// Checked only at iteration boundaries by [`crate::allocator::greedy::GreedyAllocator`];
/// flipping it mid-iteration does not interrupt the iteration in
/// progress, it only stops the next one from starting.
#[derive(Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
