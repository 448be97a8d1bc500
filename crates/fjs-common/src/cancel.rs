//! Cooperative cancellation for long-running per-file analysis.
//!
//! A `CancelToken` is cloned into every worker; passes check it between node
//! visits so one pathological file can be aborted without blocking siblings.
//! A cancelled pass returns early with whatever results it has gathered.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
