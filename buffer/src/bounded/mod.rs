// src/bounded/mod.rs

//! A fixed-capacity, monitor-coordinated FIFO buffer shared between any number
//! of producers and consumers.
//!
//! `put` blocks while the buffer is full and `get` blocks while it is empty.
//! Both run their check, mutation and notification under one lock, so the
//! length of the buffer never leaves `0..=capacity` at any observable point.
//!
//! The same buffer can be driven from threads (`put`, `get`, and their
//! `try_`, `_timeout` and `_cancellable` variants) and from async tasks
//! (`put_async`, `get_async`, `stream`) at the same time.
//!
//! ### Shutting down
//!
//! [`BoundedBuffer::close`] is the shutdown path. It wakes every blocked
//! producer and consumer; producers get their value back in a `Closed` error,
//! consumers keep draining buffered items and then observe `Closed`.

pub use async_impl::{GetFuture, GetStream, PutFuture};

mod async_impl;
pub(crate) mod core;
mod sync_impl;


use self::core::BufferShared;
use crate::builder::BufferBuilder;
use crate::cancel::CancelToken;
use crate::error::{
  BuildError, CloseError, GetError, GetTimeoutError, PutError, PutTimeoutError, TryGetError, TryPutError,
};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A handle to a bounded blocking buffer.
///
/// Handles are cheap to clone; every clone refers to the same buffer, which
/// lives until the last handle is dropped. Items still buffered at that point
/// are dropped with it.
///
/// Give each thread its own clone. When a handle is dropped (including during
/// a panic) and every remaining handle is blocked in `put` or `get` with
/// nothing left to wake it, the buffer closes itself and those calls return
/// `Closed`.
pub struct BoundedBuffer<T> {
  pub(crate) shared: Arc<BufferShared<T>>,
}

impl<T> Clone for BoundedBuffer<T> {
  fn clone(&self) -> Self {
    self.shared.acquire_handle();
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<T> Drop for BoundedBuffer<T> {
  fn drop(&mut self) {
    self.shared.release_handle();
  }
}

impl<T> fmt::Debug for BoundedBuffer<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.shared.state.lock();
    f.debug_struct("BoundedBuffer")
      .field("name", &self.shared.name)
      .field("capacity", &self.shared.capacity)
      .field("len", &state.items.len())
      .field("closed", &state.closed)
      .finish()
  }
}

impl<T: Send> BoundedBuffer<T> {
  /// Creates a buffer that holds at most `capacity` items.
  ///
  /// # Errors
  ///
  /// Returns `Err(BuildError::ZeroCapacity)` if `capacity` is zero.
  pub fn new(capacity: usize) -> Result<Self, BuildError> {
    BufferBuilder::new(capacity).build()
  }

  /// Returns a builder for a buffer of the given capacity.
  pub fn builder(capacity: usize) -> BufferBuilder<T> {
    BufferBuilder::new(capacity)
  }

  pub(crate) fn from_shared(shared: BufferShared<T>) -> Self {
    Self {
      shared: Arc::new(shared),
    }
  }

  // --- Blocking API ---

  /// Appends `value` at the tail, blocking the current thread while the
  /// buffer is full.
  ///
  /// # Errors
  ///
  /// Returns `Err(PutError::Closed(value))` if the buffer is or becomes closed
  /// before space is available.
  pub fn put(&self, value: T) -> Result<(), PutError<T>> {
    sync_impl::put_sync(&self.shared, value)
  }

  /// Removes and returns the head item, blocking the current thread while the
  /// buffer is empty.
  ///
  /// # Errors
  ///
  /// Returns `Err(GetError::Closed)` once the buffer is closed and drained.
  pub fn get(&self) -> Result<T, GetError> {
    sync_impl::get_sync(&self.shared)
  }

  /// Attempts to append `value` without blocking.
  pub fn try_put(&self, value: T) -> Result<(), TryPutError<T>> {
    self.shared.try_put_core(value)
  }

  /// Attempts to take the head item without blocking.
  pub fn try_get(&self) -> Result<T, TryGetError> {
    self.shared.try_get_core()
  }

  /// Appends `value`, blocking for at most `timeout` while the buffer is full.
  ///
  /// # Errors
  ///
  /// - `Err(PutTimeoutError::Timeout(value))` if no space became available in time.
  /// - `Err(PutTimeoutError::Closed(value))` if the buffer is closed.
  pub fn put_timeout(&self, value: T, timeout: Duration) -> Result<(), PutTimeoutError<T>> {
    sync_impl::put_timeout_sync(&self.shared, value, timeout)
  }

  /// Takes the head item, blocking for at most `timeout` while the buffer is empty.
  ///
  /// # Errors
  ///
  /// - `Err(GetTimeoutError::Timeout)` if no item arrived in time.
  /// - `Err(GetTimeoutError::Closed)` if the buffer is closed and drained.
  pub fn get_timeout(&self, timeout: Duration) -> Result<T, GetTimeoutError> {
    sync_impl::get_timeout_sync(&self.shared, timeout)
  }

  /// Returns a blocking iterator that yields items until the buffer is closed
  /// and drained.
  pub fn iter(&self) -> Iter<'_, T> {
    Iter { buffer: self }
  }

  // --- Async API ---

  /// Appends `value` at the tail, waiting asynchronously while the buffer is full.
  ///
  /// Dropping the returned future before it completes cancels the put; the
  /// buffer is unchanged and `value` is dropped with the future.
  pub fn put_async(&self, value: T) -> PutFuture<'_, T> {
    PutFuture::new(&self.shared, value)
  }

  /// Removes and returns the head item, waiting asynchronously while the
  /// buffer is empty.
  pub fn get_async(&self) -> GetFuture<'_, T> {
    GetFuture::new(&self.shared)
  }

  /// Returns a stream of items that ends once the buffer is closed and drained.
  pub fn stream(&self) -> GetStream<'_, T> {
    GetStream::new(&self.shared)
  }

  // --- Lifecycle & introspection ---

  /// Closes the buffer, waking every blocked producer and consumer.
  ///
  /// After closing, every put fails with a `Closed` error that returns the
  /// value. Gets keep returning buffered items and fail with `Closed` once the
  /// buffer is empty.
  ///
  /// # Errors
  ///
  /// Returns `Err(CloseError)` if the buffer was already closed.
  pub fn close(&self) -> Result<(), CloseError> {
    self.shared.close()
  }

  /// Returns `true` once [`close`](Self::close) has been called.
  pub fn is_closed(&self) -> bool {
    self.shared.state.lock().closed
  }

  /// Returns the number of items currently buffered.
  #[inline]
  pub fn len(&self) -> usize {
    self.shared.state.lock().items.len()
  }

  /// Returns `true` if no items are buffered.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns `true` if the buffer holds `capacity` items.
  #[inline]
  pub fn is_full(&self) -> bool {
    self.len() == self.shared.capacity
  }

  /// Returns the fixed capacity the buffer was built with.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.shared.capacity
  }
}

impl<T: Send + 'static> BoundedBuffer<T> {
  /// Like [`put`](Self::put), but the wait for space can be interrupted by
  /// cancelling `token`.
  ///
  /// A put that can complete immediately does so even if `token` is already
  /// cancelled; the token only interrupts waiting.
  ///
  /// # Errors
  ///
  /// - `Err(PutError::Cancelled(value))` if `token` was cancelled while the buffer was full.
  /// - `Err(PutError::Closed(value))` if the buffer is closed.
  pub fn put_cancellable(&self, value: T, token: &CancelToken) -> Result<(), PutError<T>> {
    sync_impl::put_cancellable_sync(&self.shared, value, token)
  }

  /// Like [`get`](Self::get), but the wait for an item can be interrupted by
  /// cancelling `token`.
  ///
  /// # Errors
  ///
  /// - `Err(GetError::Cancelled)` if `token` was cancelled while the buffer was empty.
  /// - `Err(GetError::Closed)` if the buffer is closed and drained.
  pub fn get_cancellable(&self, token: &CancelToken) -> Result<T, GetError> {
    sync_impl::get_cancellable_sync(&self.shared, token)
  }
}

/// A blocking iterator over the items of a [`BoundedBuffer`].
///
/// Created by [`BoundedBuffer::iter`].
#[derive(Debug)]
pub struct Iter<'a, T> {
  buffer: &'a BoundedBuffer<T>,
}

impl<T: Send> Iterator for Iter<'_, T> {
  type Item = T;

  fn next(&mut self) -> Option<T> {
    self.buffer.get().ok()
  }
}

impl<'a, T: Send> IntoIterator for &'a BoundedBuffer<T> {
  type Item = T;
  type IntoIter = Iter<'a, T>;

  fn into_iter(self) -> Iter<'a, T> {
    self.iter()
  }
}
