//! Hooks for watching a buffer's state transitions.

use std::fmt;

/// The side of the buffer an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
  /// Adding an item.
  Put,
  /// Taking an item.
  Get,
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operation::Put => write!(f, "put"),
      Operation::Get => write!(f, "get"),
    }
  }
}

/// A state transition of a [`BoundedBuffer`](crate::BoundedBuffer), reported
/// to its [`BufferObserver`].
///
/// Every `len` is read while the buffer lock is held, so it is exactly the
/// length any other caller would observe at that instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferEvent {
  /// An item was appended. `len` is the length after the append.
  Put {
    /// Buffered items after the append.
    len: usize,
    /// The buffer's fixed capacity.
    capacity: usize,
  },
  /// An item was removed. `len` is the length after the removal.
  Get {
    /// Buffered items after the removal.
    len: usize,
    /// The buffer's fixed capacity.
    capacity: usize,
  },
  /// A blocking caller found the buffer full (`Put`) or empty (`Get`) and is
  /// about to release the lock and wait.
  Blocked {
    /// The operation that has to wait.
    op: Operation,
    /// Buffered items when the caller blocked.
    len: usize,
  },
  /// The buffer was closed with `len` items still buffered.
  Closed {
    /// Items left in the buffer at close time.
    len: usize,
  },
}

impl BufferEvent {
  /// The buffer length carried by this event.
  pub fn buffer_len(&self) -> usize {
    match *self {
      BufferEvent::Put { len, .. }
      | BufferEvent::Get { len, .. }
      | BufferEvent::Blocked { len, .. }
      | BufferEvent::Closed { len } => len,
    }
  }
}

/// A hook that can be registered with a buffer to observe every mutation,
/// every suspension and the close.
///
/// `on_event` runs while the buffer lock is held. It must be quick and must
/// not call back into the buffer it observes (including cancelling a token
/// that has a waiter registered on that buffer), or it will deadlock.
pub trait BufferObserver: Send + Sync {
  /// Receives one event, in the order the buffer lock was taken.
  fn on_event(&self, event: BufferEvent);
}

impl<F> BufferObserver for F
where
  F: Fn(BufferEvent) + Send + Sync,
{
  fn on_event(&self, event: BufferEvent) {
    self(event)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use parking_lot::Mutex;
  use std::sync::Arc;

  #[test]
  fn closures_are_observers() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let observer = move |event: BufferEvent| sink.lock().push(event);

    observer.on_event(BufferEvent::Put { len: 1, capacity: 4 });
    observer.on_event(BufferEvent::Closed { len: 1 });

    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].buffer_len(), 1);
    assert_eq!(seen[1], BufferEvent::Closed { len: 1 });
  }
}
