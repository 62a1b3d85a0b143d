//! Implementation of the synchronous, blocking put and get logic.
//!
//! Every function here follows the same shape: take the lock once, then loop
//! over "check predicate, act, or wait". The condition variable releases the
//! lock while waiting and re-acquires it before the loop re-checks, so spurious
//! and broadcast wakeups are harmless. A waiter only leaves without acting
//! when its predicate is false, which means it never walks away with a
//! notification that another waiter needed.

use super::core::BufferShared;
use crate::cancel::{CancelToken, Interrupt};
use crate::error::{GetError, GetTimeoutError, PutError, PutTimeoutError};
use crate::observer::Operation;
use crate::telemetry;

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Blocks until there is space, then appends `item`.
pub(crate) fn put_sync<T: Send>(shared: &BufferShared<T>, item: T) -> Result<(), PutError<T>> {
  let mut guard = shared.state.lock();
  loop {
    if guard.closed {
      return Err(PutError::Closed(item));
    }
    if shared.has_space(&guard) {
      shared.push_locked(&mut guard, item);
      return Ok(());
    }
    shared.park(&mut guard, Operation::Put);
  }
}

/// Blocks until an item is available, then removes it.
pub(crate) fn get_sync<T: Send>(shared: &BufferShared<T>) -> Result<T, GetError> {
  let mut guard = shared.state.lock();
  loop {
    if let Some(item) = shared.pop_locked(&mut guard) {
      return Ok(item);
    }
    if guard.closed {
      return Err(GetError::Closed);
    }
    shared.park(&mut guard, Operation::Get);
  }
}

/// Like [`put_sync`], giving up once `timeout` has elapsed.
pub(crate) fn put_timeout_sync<T: Send>(
  shared: &BufferShared<T>,
  item: T,
  timeout: Duration,
) -> Result<(), PutTimeoutError<T>> {
  // A deadline too far out to represent is as good as no deadline.
  let deadline = match Instant::now().checked_add(timeout) {
    Some(deadline) => deadline,
    None => return put_sync(shared, item).map_err(|e| PutTimeoutError::Closed(e.into_inner())),
  };

  let mut guard = shared.state.lock();
  loop {
    if guard.closed {
      return Err(PutTimeoutError::Closed(item));
    }
    if shared.has_space(&guard) {
      shared.push_locked(&mut guard, item);
      return Ok(());
    }
    if Instant::now() >= deadline {
      telemetry::increment_counter("BoundedBuffer::put", "Timeout");
      tracing::trace!(buffer = shared.label(), ?timeout, "put timed out waiting for space");
      return Err(PutTimeoutError::Timeout(item));
    }
    shared.note_blocked(&guard, Operation::Put);
    shared.not_full.wait_until(&mut guard, deadline);
  }
}

/// Like [`get_sync`], giving up once `timeout` has elapsed.
pub(crate) fn get_timeout_sync<T: Send>(shared: &BufferShared<T>, timeout: Duration) -> Result<T, GetTimeoutError> {
  let deadline = match Instant::now().checked_add(timeout) {
    Some(deadline) => deadline,
    None => return get_sync(shared).map_err(|_| GetTimeoutError::Closed),
  };

  let mut guard = shared.state.lock();
  loop {
    if let Some(item) = shared.pop_locked(&mut guard) {
      return Ok(item);
    }
    if guard.closed {
      return Err(GetTimeoutError::Closed);
    }
    if Instant::now() >= deadline {
      telemetry::increment_counter("BoundedBuffer::get", "Timeout");
      tracing::trace!(buffer = shared.label(), ?timeout, "get timed out waiting for an item");
      return Err(GetTimeoutError::Timeout);
    }
    shared.note_blocked(&guard, Operation::Get);
    shared.not_empty.wait_until(&mut guard, deadline);
  }
}

/// Like [`put_sync`], but a wait can be interrupted through `token`.
///
/// The token is only consulted when the buffer is full: a put that can
/// complete immediately does so even if the token is already cancelled.
pub(crate) fn put_cancellable_sync<T: Send + 'static>(
  shared: &Arc<BufferShared<T>>,
  item: T,
  token: &CancelToken,
) -> Result<(), PutError<T>> {
  let target: Arc<dyn Interrupt> = shared.clone();
  // Declared before the guard so it is dropped after the lock is released.
  let _registration = token.register(target);

  let mut guard = shared.state.lock();
  loop {
    if guard.closed {
      return Err(PutError::Closed(item));
    }
    if shared.has_space(&guard) {
      shared.push_locked(&mut guard, item);
      return Ok(());
    }
    if token.is_cancelled() {
      telemetry::increment_counter("BoundedBuffer::put", "Cancelled");
      tracing::trace!(buffer = shared.label(), len = guard.items.len(), "put cancelled while buffer full");
      return Err(PutError::Cancelled(item));
    }
    shared.note_blocked(&guard, Operation::Put);
    shared.not_full.wait(&mut guard);
  }
}

/// Like [`get_sync`], but a wait can be interrupted through `token`.
pub(crate) fn get_cancellable_sync<T: Send + 'static>(
  shared: &Arc<BufferShared<T>>,
  token: &CancelToken,
) -> Result<T, GetError> {
  let target: Arc<dyn Interrupt> = shared.clone();
  let _registration = token.register(target);

  let mut guard = shared.state.lock();
  loop {
    if let Some(item) = shared.pop_locked(&mut guard) {
      return Ok(item);
    }
    if guard.closed {
      return Err(GetError::Closed);
    }
    if token.is_cancelled() {
      telemetry::increment_counter("BoundedBuffer::get", "Cancelled");
      tracing::trace!(buffer = shared.label(), "get cancelled while buffer empty");
      return Err(GetError::Cancelled);
    }
    shared.note_blocked(&guard, Operation::Get);
    shared.not_empty.wait(&mut guard);
  }
}
