// src/bounded/async_impl.rs
//! Implementation of the asynchronous Future-based put and get logic.
//!
//! Dropping a pending future is how async callers cancel: a pending future has
//! not touched the buffer, so dropping it leaves the buffer unchanged. A stale
//! waker it left behind is discarded on the next wakeup of its side.

use futures_core::Stream;

use super::core::{register_waker, BufferShared};
use crate::error::{GetError, PutError};
use crate::observer::Operation;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

// --- PutFuture ---

/// A future that completes once a value has been put into the buffer.
#[must_use = "futures do nothing unless you .await or poll them"]
pub struct PutFuture<'a, T> {
  shared: &'a BufferShared<T>,
  // Held here until the buffer accepts it.
  item: Option<T>,
}

// The item is never pinned; it is only moved in and out of the `Option`.
impl<T> Unpin for PutFuture<'_, T> {}

impl<'a, T> PutFuture<'a, T> {
  pub(super) fn new(shared: &'a BufferShared<T>, item: T) -> Self {
    Self {
      shared,
      item: Some(item),
    }
  }
}

impl<T> std::fmt::Debug for PutFuture<'_, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PutFuture")
      .field("pending_item", &self.item.is_some())
      .finish()
  }
}

impl<T: Send> Future for PutFuture<'_, T> {
  type Output = Result<(), PutError<T>>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    let shared = this.shared;
    let item = match this.item.take() {
      Some(item) => item,
      None => panic!("PutFuture polled after completion"),
    };

    let mut guard = shared.state.lock();
    if guard.closed {
      return Poll::Ready(Err(PutError::Closed(item)));
    }
    if shared.has_space(&guard) {
      shared.push_locked(&mut guard, item);
      return Poll::Ready(Ok(()));
    }

    // Full: keep the item and wait for a get to wake us.
    shared.note_blocked(&guard, Operation::Put);
    register_waker(&mut guard.waiting_async_putters, cx.waker());
    this.item = Some(item);
    Poll::Pending
  }
}

// --- GetFuture ---

/// A future that completes with the next item taken from the buffer.
#[must_use = "futures do nothing unless you .await or poll them"]
pub struct GetFuture<'a, T> {
  shared: &'a BufferShared<T>,
}

impl<'a, T> GetFuture<'a, T> {
  pub(super) fn new(shared: &'a BufferShared<T>) -> Self {
    Self { shared }
  }
}

impl<T> std::fmt::Debug for GetFuture<'_, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GetFuture").finish_non_exhaustive()
  }
}

impl<T: Send> Future for GetFuture<'_, T> {
  type Output = Result<T, GetError>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    self.shared.poll_get(cx).map(|item| item.ok_or(GetError::Closed))
  }
}

// --- GetStream ---

/// A stream of items taken from the buffer. It ends once the buffer is closed
/// and drained.
#[must_use = "streams do nothing unless polled"]
pub struct GetStream<'a, T> {
  shared: &'a BufferShared<T>,
}

impl<'a, T> GetStream<'a, T> {
  pub(super) fn new(shared: &'a BufferShared<T>) -> Self {
    Self { shared }
  }
}

impl<T> std::fmt::Debug for GetStream<'_, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GetStream").finish_non_exhaustive()
  }
}

impl<T: Send> Stream for GetStream<'_, T> {
  type Item = T;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    self.shared.poll_get(cx)
  }
}
