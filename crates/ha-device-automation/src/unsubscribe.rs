//! Cancellation handle returned when attaching a trigger

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::trace;

type Teardown = Box<dyn FnOnce() + Send>;

/// Removes a trigger subscription when called
///
/// Calling it more than once is a no-op, as is calling it after the
/// subscription already ended on its own.
pub struct Unsubscribe {
    active: Arc<AtomicBool>,
    teardown: Mutex<Option<Teardown>>,
}

impl Unsubscribe {
    /// Handle running `teardown` on first call
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
            teardown: Mutex::new(Some(Box::new(teardown))),
        }
    }

    /// Handle for a listener task
    ///
    /// `active` is shared with the task so it stops invoking its action
    /// as soon as the handle is called, even before the abort lands.
    pub fn for_task(active: Arc<AtomicBool>, task: JoinHandle<()>) -> Self {
        Self {
            active,
            teardown: Mutex::new(Some(Box::new(move || task.abort()))),
        }
    }

    /// Remove the subscription
    pub fn call(&self) {
        self.active.store(false, Ordering::SeqCst);

        let teardown = match self.teardown.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match teardown {
            Some(teardown) => {
                trace!("Removing trigger subscription");
                teardown();
            }
            None => trace!("Trigger subscription already removed"),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("active", &self.is_active())
            .finish()
    }
}
