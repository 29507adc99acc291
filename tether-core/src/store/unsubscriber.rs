//! Removal handle returned by `subscribe`.

use std::fmt;

use parking_lot::Mutex;

type Release = Box<dyn FnOnce() + Send>;

/// Handle that ends exactly one subscription.
///
/// The release runs at most once: the first call to [`unsubscribe`] removes
/// the registration (running the invalidator, if one was given) and every
/// later call is a no-op. Dropping the handle releases the subscription too,
/// so keep it alive for as long as the callback should fire, or call
/// [`detach`] to leave the subscription registered for the store's lifetime.
///
/// [`unsubscribe`]: Unsubscriber::unsubscribe
/// [`detach`]: Unsubscriber::detach
#[must_use = "dropping an Unsubscriber ends the subscription"]
pub struct Unsubscriber {
    release: Mutex<Option<Release>>,
}

impl Unsubscriber {
    /// Wrap a release closure.
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Mutex::new(Some(Box::new(release))),
        }
    }

    /// A handle with nothing to release.
    pub fn noop() -> Self {
        Self {
            release: Mutex::new(None),
        }
    }

    /// End the subscription. Idempotent.
    pub fn unsubscribe(&self) {
        // Take under the lock, run outside it: the release re-enters the store.
        let release = self.release.lock().take();
        if let Some(release) = release {
            release();
        }
    }

    /// Whether the subscription has not been released yet.
    pub fn is_active(&self) -> bool {
        self.release.lock().is_some()
    }

    /// Give up the handle without ending the subscription.
    pub fn detach(self) {
        drop(self.release.lock().take());
    }
}

impl Drop for Unsubscriber {
    fn drop(&mut self) {
        if let Some(release) = self.release.get_mut().take() {
            release();
        }
    }
}

impl fmt::Debug for Unsubscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscriber")
            .field("active", &self.is_active())
            .finish()
    }
}
