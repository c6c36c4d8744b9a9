use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{LipsyncError, LipsyncResult};

/// Cooperative cancellation flag shared between a job and whoever may stop it.
///
/// Clones share the flag. Long-running stages poll [`CancelToken::check`] at chunk boundaries.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once [`CancelToken::cancel`] has been called on any clone.
    pub fn check(&self) -> LipsyncResult<()> {
        if self.is_cancelled() {
            Err(LipsyncError::Cancelled)
        } else {
            Ok(())
        }
    }
}
