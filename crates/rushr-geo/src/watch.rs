//! Watch handles
//!
//! A watch is a subscription to continuous position updates, active
//! until explicitly cancelled. The handle gates callback delivery with
//! an atomic flag, so after `cancel` returns no further callbacks fire
//! even if the backend keeps pushing. A cancel that arrives before the
//! native watch id has resolved is queued: the moment the id lands, the
//! watch is cleared instead of leaking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::platform::{BrowserGeolocation, BrowserWatchId, NativeGeolocation, NativeWatchId};

/// What the handle must clear on cancellation
enum Binding {
    /// Native watch id not delivered yet
    Pending,
    Native(Arc<dyn NativeGeolocation>, NativeWatchId),
    Browser(Arc<dyn BrowserGeolocation>, BrowserWatchId),
    /// Nothing to clear (never bound, or already cleared)
    Detached,
}

struct WatchInner {
    active: AtomicBool,
    binding: Mutex<Binding>,
}

/// Cancellation token for a position watch
///
/// `cancel` is idempotent; clones share the same underlying watch.
#[derive(Clone)]
pub struct WatchHandle {
    inner: Arc<WatchInner>,
}

impl WatchHandle {
    /// Handle for a watch whose backend registration is still in flight
    pub(crate) fn pending() -> Self {
        Self {
            inner: Arc::new(WatchInner {
                active: AtomicBool::new(true),
                binding: Mutex::new(Binding::Pending),
            }),
        }
    }

    /// Already-cancelled handle; used when no capability exists
    pub(crate) fn inert() -> Self {
        Self {
            inner: Arc::new(WatchInner {
                active: AtomicBool::new(false),
                binding: Mutex::new(Binding::Detached),
            }),
        }
    }

    /// True until `cancel` is called; sinks consult this before
    /// delivering any callback
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Stop the watch. Idempotent; after this returns, no further
    /// position or error callbacks are delivered for this watch.
    pub fn cancel(&self) {
        if !self.inner.active.swap(false, Ordering::AcqRel) {
            return;
        }
        let binding =
            std::mem::replace(&mut *self.inner.binding.lock().unwrap(), Binding::Detached);
        match binding {
            Binding::Pending | Binding::Detached => {}
            Binding::Native(backend, id) => {
                tracing::debug!(watch = %id, "clearing native watch");
                smol::spawn(async move {
                    backend.clear_watch(id).await;
                })
                .detach();
            }
            Binding::Browser(backend, id) => {
                tracing::debug!(watch = id, "clearing browser watch");
                backend.clear_watch(id);
            }
        }
    }

    /// Record the native watch id once the bridge delivers it; if the
    /// handle was cancelled in the meantime, clear the watch right away
    pub(crate) async fn bind_native(&self, backend: Arc<dyn NativeGeolocation>, id: NativeWatchId) {
        let cancelled_early = {
            let mut binding = self.inner.binding.lock().unwrap();
            if self.is_active() {
                *binding = Binding::Native(backend.clone(), id.clone());
                false
            } else {
                true
            }
        };
        if cancelled_early {
            tracing::debug!(watch = %id, "watch cancelled before it was established; clearing");
            backend.clear_watch(id).await;
        }
    }

    /// Record the browser watch id; registration is synchronous so a
    /// cancel can only have raced in from another thread
    pub(crate) fn bind_browser(&self, backend: Arc<dyn BrowserGeolocation>, id: BrowserWatchId) {
        let mut binding = self.inner.binding.lock().unwrap();
        if self.is_active() {
            *binding = Binding::Browser(backend, id);
        } else {
            drop(binding);
            backend.clear_watch(id);
        }
    }
}
