//! Configuration of a [`BoundedBuffer`] before it is created.

use crate::bounded::core::BufferShared;
use crate::bounded::BoundedBuffer;
use crate::error::BuildError;
use crate::observer::BufferObserver;

use core::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A builder for creating [`BoundedBuffer`] instances.
pub struct BufferBuilder<T> {
  capacity: usize,
  name: Option<String>,
  observer: Option<Arc<dyn BufferObserver>>,
  _value_marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for BufferBuilder<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BufferBuilder")
      .field("capacity", &self.capacity)
      .field("name", &self.name)
      .field("has_observer", &self.observer.is_some())
      .finish()
  }
}

impl<T: Send> BufferBuilder<T> {
  /// Creates a builder for a buffer holding at most `capacity` items.
  pub fn new(capacity: usize) -> Self {
    Self {
      capacity,
      name: None,
      observer: None,
      _value_marker: PhantomData,
    }
  }

  /// Sets the maximum number of buffered items.
  pub fn capacity(mut self, capacity: usize) -> Self {
    self.capacity = capacity;
    self
  }

  /// Sets a label that identifies this buffer in log records.
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  /// Sets the observer notified of every put, get, suspension and the close.
  pub fn observer<Observer>(mut self, observer: Observer) -> Self
  where
    Observer: BufferObserver + 'static,
  {
    self.observer = Some(Arc::new(observer));
    self
  }

  /// Builds the buffer.
  ///
  /// # Errors
  ///
  /// Returns `Err(BuildError::ZeroCapacity)` if the capacity is zero.
  pub fn build(self) -> Result<BoundedBuffer<T>, BuildError> {
    if self.capacity == 0 {
      return Err(BuildError::ZeroCapacity);
    }

    let shared = BufferShared::new(self.capacity, self.name, self.observer);
    tracing::debug!(
      buffer = shared.label(),
      capacity = shared.capacity,
      "bounded buffer created"
    );
    Ok(BoundedBuffer::from_shared(shared))
  }
}
