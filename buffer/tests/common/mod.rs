#![allow(dead_code)]

use fibre_buffer::{BoundedBuffer, BufferEvent, Operation};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(100);
pub const LONG_TIMEOUT: Duration = Duration::from_secs(3);
pub const STRESS_TIMEOUT: Duration = Duration::from_secs(15);
pub const ITEMS_LOW: usize = 50;
pub const ITEMS_MEDIUM: usize = 200;
pub const ITEMS_HIGH: usize = 1000;

/// An observer that keeps every event in the order the buffer reported it.
#[derive(Clone, Default)]
pub struct EventLog {
  events: Arc<Mutex<Vec<BufferEvent>>>,
}

impl EventLog {
  pub fn buffer<T: Send>(&self, capacity: usize) -> BoundedBuffer<T> {
    let events = self.events.clone();
    BoundedBuffer::builder(capacity)
      .observer(move |event: BufferEvent| events.lock().push(event))
      .build()
      .unwrap()
  }

  pub fn snapshot(&self) -> Vec<BufferEvent> {
    self.events.lock().clone()
  }

  pub fn blocked(&self, op: Operation) -> usize {
    self
      .events
      .lock()
      .iter()
      .filter(|e| matches!(e, BufferEvent::Blocked { op: o, .. } if *o == op))
      .count()
  }

  /// Waits until at least `count` waits on `op` have been reported.
  pub fn wait_for_blocked(&self, op: Operation, count: usize) {
    let start = Instant::now();
    while self.blocked(op) < count {
      assert!(start.elapsed() < LONG_TIMEOUT, "timed out waiting for a blocked {}", op);
      std::thread::sleep(Duration::from_millis(1));
    }
  }
}
