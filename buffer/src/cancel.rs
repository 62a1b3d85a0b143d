//! Cooperative cancellation for blocking buffer operations.
//!
//! A thread parked inside `put_cancellable`/`get_cancellable` is waiting on a
//! condition variable that belongs to the buffer. To interrupt it, `cancel`
//! must notify that condition variable while holding the buffer's lock, so the
//! waiter either observes the flag before it parks or is woken after it parks.
//! Each waiting call therefore registers its buffer with the token for the
//! duration of the wait.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Something that can wake all of its blocked waiters.
pub(crate) trait Interrupt: Send + Sync {
  /// Must acquire the lock the waiters check the cancellation flag under
  /// before notifying them.
  fn interrupt(&self);
}

struct TokenInner {
  cancelled: AtomicBool,
  next_id: AtomicU64,
  registrations: Mutex<Vec<(u64, Arc<dyn Interrupt>)>>,
}

/// A cloneable cancellation signal for blocked `put`/`get` calls.
///
/// All clones share the same signal. Once cancelled, a token stays cancelled;
/// create a new token for the next operation.
#[derive(Clone)]
pub struct CancelToken {
  inner: Arc<TokenInner>,
}

impl fmt::Debug for CancelToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CancelToken")
      .field("cancelled", &self.is_cancelled())
      .field("registrations", &self.inner.registrations.lock().len())
      .finish()
  }
}

impl Default for CancelToken {
  fn default() -> Self {
    Self::new()
  }
}

impl CancelToken {
  /// Creates a token that has not been cancelled.
  pub fn new() -> Self {
    Self {
      inner: Arc::new(TokenInner {
        cancelled: AtomicBool::new(false),
        next_id: AtomicU64::new(0),
        registrations: Mutex::new(Vec::new()),
      }),
    }
  }

  /// Signals cancellation and wakes every operation currently waiting with
  /// this token. Calling it again has no effect.
  pub fn cancel(&self) {
    if self.inner.cancelled.swap(true, Ordering::SeqCst) {
      return;
    }
    // Snapshot and release the registry lock before interrupting: `interrupt`
    // takes the buffer lock, and a waiter may hold the buffer lock while it
    // deregisters.
    let targets: Vec<Arc<dyn Interrupt>> = self
      .inner
      .registrations
      .lock()
      .iter()
      .map(|(_, target)| Arc::clone(target))
      .collect();
    for target in targets {
      target.interrupt();
    }
  }

  /// Returns `true` once [`cancel`](Self::cancel) has been called on any clone.
  #[inline]
  pub fn is_cancelled(&self) -> bool {
    self.inner.cancelled.load(Ordering::SeqCst)
  }

  /// Registers `target` to be interrupted on cancellation until the returned
  /// guard is dropped.
  pub(crate) fn register(&self, target: Arc<dyn Interrupt>) -> Registration<'_> {
    let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
    self.inner.registrations.lock().push((id, target));
    Registration { token: self, id }
  }
}

/// Removes a registration from its token when dropped.
pub(crate) struct Registration<'a> {
  token: &'a CancelToken,
  id: u64,
}

impl Drop for Registration<'_> {
  fn drop(&mut self) {
    let mut registrations = self.token.inner.registrations.lock();
    if let Some(pos) = registrations.iter().position(|(id, _)| *id == self.id) {
      registrations.swap_remove(pos);
    }
  }
}
