//! Outstanding-work tracking for launched actions
//!
//! A [`WaitGroup`] counts actions that have been launched on their own thread
//! but have not returned yet. The dispatching thread registers and spawns in one
//! step with [`WaitGroup::start`] and drains with [`WaitGroup::wait`].

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;

#[derive(Default)]
struct Inner {
    in_flight: Mutex<usize>,
    changed: Condvar,
    launched: AtomicUsize,
    panicked: AtomicUsize,
    #[cfg(test)]
    refuse_spawns: std::sync::atomic::AtomicBool,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, usize> {
        // Only counter arithmetic runs under the lock, so a poisoned guard is still consistent
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish_one(&self) {
        let mut in_flight = self.lock();
        *in_flight -= 1;
        self.changed.notify_all();
    }
}

/// Marks one action complete when dropped, including while unwinding
struct Completion(Arc<Inner>);

impl Drop for Completion {
    fn drop(&mut self) {
        self.0.finish_one();
    }
}

/// Counted-wait set of running actions
///
/// Cloning yields another handle to the same set.
#[derive(Clone, Default)]
pub struct WaitGroup {
    inner: Arc<Inner>,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` and run it on a new thread named `name`
    ///
    /// The action is counted before the thread exists, so a concurrent
    /// [`wait`](Self::wait) can never observe a launched action as missing.
    /// A panic inside `f` is contained to its thread and still counts as a
    /// completion. Fails only when the OS refuses to create the thread, in which
    /// case `f` is dropped without running and the registration is rolled back.
    pub fn start<F>(&self, name: String, f: F) -> io::Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        *self.inner.lock() += 1;

        let inner = Arc::clone(&self.inner);
        let spawned = self.spawn(name, move || {
            let _done = Completion(Arc::clone(&inner));
            if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
                inner.panicked.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    thread = thread::current().name().unwrap_or("<unnamed>"),
                    "Action panicked; continuing with remaining actions"
                );
            }
        });

        match spawned {
            Ok(_detached) => {
                self.inner.launched.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.inner.finish_one();
                Err(e)
            }
        }
    }

    fn spawn<F>(&self, name: String, body: F) -> io::Result<thread::JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        #[cfg(test)]
        if self.inner.refuse_spawns.load(Ordering::Relaxed) {
            return Err(io::Error::new(io::ErrorKind::WouldBlock, "thread creation refused"));
        }
        thread::Builder::new().name(name).spawn(body)
    }

    /// Make every following `start` fail as if the OS refused a new thread
    #[cfg(test)]
    pub(crate) fn refuse_spawns(&self, refuse: bool) {
        self.inner.refuse_spawns.store(refuse, Ordering::Relaxed);
    }

    /// Block until every started action has returned
    pub fn wait(&self) {
        let mut in_flight = self.inner.lock();
        while *in_flight > 0 {
            in_flight = self.inner.changed.wait(in_flight).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until fewer than `limit` actions are running
    pub fn wait_below(&self, limit: usize) {
        let mut in_flight = self.inner.lock();
        while *in_flight >= limit {
            in_flight = self.inner.changed.wait(in_flight).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Number of actions currently running
    pub fn in_flight(&self) -> usize {
        *self.inner.lock()
    }

    /// Number of actions successfully launched so far
    pub fn launched(&self) -> usize {
        self.inner.launched.load(Ordering::Relaxed)
    }

    /// Number of launched actions that panicked
    pub fn panicked(&self) -> usize {
        self.inner.panicked.load(Ordering::Relaxed)
    }
}
