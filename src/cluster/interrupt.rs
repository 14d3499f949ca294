use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Stop conditions checked between units of clustering work.
#[derive(Debug, Clone, Default)]
pub(crate) struct Interrupt {
    pub(crate) timeout: Option<Duration>,
    pub(crate) cancel: Option<Arc<AtomicBool>>,
}

impl Interrupt {
    /// Resolve the timeout into a deadline measured from now.
    pub(crate) fn start(&self) -> Armed<'_> {
        Armed {
            deadline: self.timeout.and_then(|t| Instant::now().checked_add(t)),
            cancel: self.cancel.as_deref(),
        }
    }
}

/// An [`Interrupt`] bound to a running fit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Armed<'a> {
    deadline: Option<Instant>,
    cancel: Option<&'a AtomicBool>,
}

impl Armed<'_> {
    #[inline]
    pub(crate) fn check(&self) -> Result<()> {
        if let Some(flag) = self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Error::DeadlineExceeded);
            }
        }
        Ok(())
    }
}
