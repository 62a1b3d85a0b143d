// src/bounded/core.rs

//! The shared state of a bounded buffer and the locked primitives every
//! operation is built from.
//!
//! ### Design Principles:
//!
//! 1.  **One Monitor**: a single `parking_lot::Mutex` guards the item queue, the
//!     closed flag and the async waiter lists. Every check, mutation and
//!     notification of an operation happens under one acquisition of it.
//! 2.  **Two Conditions**: blocked threads wait on `not_full` (producers) or
//!     `not_empty` (consumers) and re-check their predicate in a loop after
//!     every wakeup.
//! 3.  **Mixed Waiters**: async tasks park their `Waker` in per-side lists. A
//!     mutation notifies one blocked thread of the opposite side and wakes every
//!     parked task of that side; the tasks re-check on their next poll.
//! 4.  **Stranded Waiters**: the state counts live handles and threads parked in
//!     plain `put`/`get`. Once a handle has been dropped, a buffer whose every
//!     remaining handle is parked with no way to proceed is closed, so those
//!     threads return `Closed` instead of sleeping forever.

use crate::cancel::Interrupt;
use crate::error::{CloseError, TryGetError, TryPutError};
use crate::observer::{BufferEvent, BufferObserver, Operation};
use crate::telemetry;

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

/// Upper bound on the slots reserved up front; larger buffers grow on demand.
const MAX_PREALLOCATED_SLOTS: usize = 1024;

/// The state protected by the buffer lock.
#[derive(Debug)]
pub(crate) struct BufferState<T> {
  pub(crate) items: VecDeque<T>,
  pub(crate) closed: bool,
  /// Tasks waiting for space.
  pub(crate) waiting_async_putters: Vec<Waker>,
  /// Tasks waiting for an item.
  pub(crate) waiting_async_getters: Vec<Waker>,
  /// Live `BoundedBuffer` handles.
  handles: usize,
  /// Threads parked in a plain `put`, with no deadline or token to end the wait.
  parked_putters: usize,
  /// Threads parked in a plain `get`.
  parked_getters: usize,
  /// Set once any handle has been dropped.
  handle_released: bool,
}

/// The shared owner of a buffer's state, wrapped in an `Arc` by every handle.
pub(crate) struct BufferShared<T> {
  pub(crate) state: Mutex<BufferState<T>>,
  pub(crate) not_full: Condvar,
  pub(crate) not_empty: Condvar,
  pub(crate) capacity: usize,
  pub(crate) name: Option<String>,
  observer: Option<Arc<dyn BufferObserver>>,
}

impl<T> BufferShared<T> {
  pub(crate) fn new(capacity: usize, name: Option<String>, observer: Option<Arc<dyn BufferObserver>>) -> Self {
    BufferShared {
      state: Mutex::new(BufferState {
        items: VecDeque::with_capacity(capacity.min(MAX_PREALLOCATED_SLOTS)),
        closed: false,
        waiting_async_putters: Vec::new(),
        waiting_async_getters: Vec::new(),
        handles: 1,
        parked_putters: 0,
        parked_getters: 0,
        handle_released: false,
      }),
      not_full: Condvar::new(),
      not_empty: Condvar::new(),
      capacity,
      name,
      observer,
    }
  }

  /// The label used in log records.
  pub(crate) fn label(&self) -> &str {
    self.name.as_deref().unwrap_or("unnamed")
  }

  #[inline]
  fn emit(&self, event: BufferEvent) {
    if let Some(observer) = &self.observer {
      observer.on_event(event);
    }
  }

  /// Panics if `len` lies outside `0..=capacity`. Reaching it means the
  /// buffer's own bookkeeping is broken; there is nothing to recover.
  #[inline]
  fn check_invariant(&self, len: usize) {
    assert!(
      len <= self.capacity,
      "bounded buffer invariant violated: length {} exceeds capacity {}",
      len,
      self.capacity
    );
  }

  /// Appends `item` and wakes the consumer side. The caller must have checked
  /// that there is space.
  pub(crate) fn push_locked(&self, guard: &mut MutexGuard<'_, BufferState<T>>, item: T) {
    guard.items.push_back(item);
    let len = guard.items.len();
    self.check_invariant(len);
    self.emit(BufferEvent::Put {
      len,
      capacity: self.capacity,
    });

    self.not_empty.notify_one();
    for waker in guard.waiting_async_getters.drain(..) {
      waker.wake();
    }
  }

  /// Removes the head item, if any, and wakes the producer side.
  pub(crate) fn pop_locked(&self, guard: &mut MutexGuard<'_, BufferState<T>>) -> Option<T> {
    let item = guard.items.pop_front()?;
    let len = guard.items.len();
    self.check_invariant(len);
    self.emit(BufferEvent::Get {
      len,
      capacity: self.capacity,
    });

    self.not_full.notify_one();
    for waker in guard.waiting_async_putters.drain(..) {
      waker.wake();
    }
    Some(item)
  }

  #[inline]
  pub(crate) fn has_space(&self, guard: &MutexGuard<'_, BufferState<T>>) -> bool {
    guard.items.len() < self.capacity
  }

  /// Reports that the caller is about to wait for `op`'s predicate.
  pub(crate) fn note_blocked(&self, guard: &MutexGuard<'_, BufferState<T>>, op: Operation) {
    let len = guard.items.len();
    self.emit(BufferEvent::Blocked { op, len });
    match op {
      Operation::Put => {
        telemetry::increment_counter("BoundedBuffer::put", "Blocked");
        telemetry::log_event(Some(len), "BoundedBuffer::put", "PutBlocked", None);
      }
      Operation::Get => {
        telemetry::increment_counter("BoundedBuffer::get", "Blocked");
        telemetry::log_event(Some(len), "BoundedBuffer::get", "GetBlocked", None);
      }
    }
  }

  pub(crate) fn try_put_core(&self, item: T) -> Result<(), TryPutError<T>> {
    let mut guard = self.state.lock();
    if guard.closed {
      return Err(TryPutError::Closed(item));
    }
    if !self.has_space(&guard) {
      return Err(TryPutError::Full(item));
    }
    self.push_locked(&mut guard, item);
    Ok(())
  }

  pub(crate) fn try_get_core(&self) -> Result<T, TryGetError> {
    let mut guard = self.state.lock();
    if let Some(item) = self.pop_locked(&mut guard) {
      return Ok(item);
    }
    if guard.closed {
      return Err(TryGetError::Closed);
    }
    Err(TryGetError::Empty)
  }

  /// Polls for an item on behalf of an async consumer, parking `cx`'s waker
  /// if the buffer is empty and still open.
  pub(crate) fn poll_get(&self, cx: &mut Context<'_>) -> Poll<Option<T>> {
    let mut guard = self.state.lock();
    if let Some(item) = self.pop_locked(&mut guard) {
      return Poll::Ready(Some(item));
    }
    if guard.closed {
      return Poll::Ready(None);
    }
    self.note_blocked(&guard, Operation::Get);
    register_waker(&mut guard.waiting_async_getters, cx.waker());
    Poll::Pending
  }

  /// Marks the buffer closed and wakes every waiter on both sides.
  pub(crate) fn close(&self) -> Result<(), CloseError> {
    let wakers = {
      let mut guard = self.state.lock();
      if guard.closed {
        return Err(CloseError);
      }
      self.mark_closed(&mut guard)
    };
    // Wake tasks outside the lock to reduce contention.
    for waker in wakers {
      waker.wake();
    }
    Ok(())
  }

  /// Sets the closed flag and notifies every blocked thread. Returns the
  /// parked async wakers for the caller to wake.
  fn mark_closed(&self, guard: &mut MutexGuard<'_, BufferState<T>>) -> Vec<Waker> {
    guard.closed = true;
    let len = guard.items.len();
    self.emit(BufferEvent::Closed { len });
    self.not_full.notify_all();
    self.not_empty.notify_all();

    telemetry::log_event(Some(len), "BoundedBuffer::close", "Closed", None);
    tracing::debug!(buffer = self.label(), capacity = self.capacity, remaining = len, "bounded buffer closed");

    let mut wakers = std::mem::take(&mut guard.waiting_async_putters);
    wakers.append(&mut guard.waiting_async_getters);
    wakers
  }

  // --- Handle accounting ---

  /// `true` when every live handle is parked in a plain `put`/`get` whose
  /// condition cannot become true. Nothing is left to wake those threads.
  fn is_stranded(&self, guard: &MutexGuard<'_, BufferState<T>>) -> bool {
    let len = guard.items.len();
    !guard.closed
      && guard.handles > 0
      && guard.parked_putters + guard.parked_getters >= guard.handles
      && (guard.parked_putters == 0 || len == self.capacity)
      && (guard.parked_getters == 0 || len == 0)
  }

  pub(crate) fn acquire_handle(&self) {
    self.state.lock().handles += 1;
  }

  /// Called when a handle is dropped. Closes the buffer if the remaining
  /// handles are all stranded waiters.
  pub(crate) fn release_handle(&self) {
    let wakers = {
      let mut guard = self.state.lock();
      guard.handles -= 1;
      guard.handle_released = true;
      if !self.is_stranded(&guard) {
        return;
      }
      tracing::debug!(
        buffer = self.label(),
        handles = guard.handles,
        "every remaining handle is blocked; closing bounded buffer"
      );
      self.mark_closed(&mut guard)
    };
    for waker in wakers {
      waker.wake();
    }
  }

  /// Parks the caller of a plain `put` or `get` until it is notified.
  ///
  /// If a handle has been dropped and this caller is the last one able to
  /// make progress, the buffer is closed instead of waiting, and the caller's
  /// loop observes `Closed`.
  pub(crate) fn park(&self, guard: &mut MutexGuard<'_, BufferState<T>>, op: Operation) {
    self.note_blocked(guard, op);
    match op {
      Operation::Put => guard.parked_putters += 1,
      Operation::Get => guard.parked_getters += 1,
    }

    if guard.handle_released && self.is_stranded(guard) {
      tracing::debug!(buffer = self.label(), %op, "no other handle can wake this caller; closing bounded buffer");
      for waker in self.mark_closed(guard) {
        waker.wake();
      }
    } else {
      match op {
        Operation::Put => self.not_full.wait(guard),
        Operation::Get => self.not_empty.wait(guard),
      }
    }

    match op {
      Operation::Put => guard.parked_putters -= 1,
      Operation::Get => guard.parked_getters -= 1,
    }
  }
}

/// Adds `waker` to `waiters` unless an equivalent waker is already parked.
pub(crate) fn register_waker(waiters: &mut Vec<Waker>, waker: &Waker) {
  if !waiters.iter().any(|w| w.will_wake(waker)) {
    waiters.push(waker.clone());
  }
}

impl<T: Send> Interrupt for BufferShared<T> {
  fn interrupt(&self) {
    // Taking the lock orders this wakeup after any waiter that has already
    // checked the cancellation flag and is about to wait.
    let _guard = self.state.lock();
    self.not_full.notify_all();
    self.not_empty.notify_all();
  }
}
