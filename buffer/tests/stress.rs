mod common;
use common::*;

use fibre_buffer::{BoundedBuffer, BufferEvent};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn length_never_leaves_bounds_under_contention() {
  let capacity = 8;
  let violations = Arc::new(AtomicUsize::new(0));
  let observed_full = Arc::new(AtomicBool::new(false));

  let buffer = {
    let violations = violations.clone();
    let observed_full = observed_full.clone();
    BoundedBuffer::builder(capacity)
      .name("stress")
      .observer(move |event: BufferEvent| {
        let len = event.buffer_len();
        if len > capacity {
          violations.fetch_add(1, Ordering::Relaxed);
        }
        if len == capacity {
          observed_full.store(true, Ordering::Relaxed);
        }
      })
      .build()
      .unwrap()
  };

  let num_producers = 6;
  let num_consumers = 3;
  let per_producer = ITEMS_HIGH;
  let total = num_producers * per_producer;
  let received = Arc::new(AtomicUsize::new(0));

  let producers: Vec<_> = (0..num_producers)
    .map(|_| {
      let buffer = buffer.clone();
      thread::spawn(move || {
        for i in 0..per_producer {
          buffer.put(i).unwrap();
          if i % 10 == 0 {
            thread::yield_now();
          }
        }
      })
    })
    .collect();

  let consumers: Vec<_> = (0..num_consumers)
    .map(|_| {
      let buffer = buffer.clone();
      let received = received.clone();
      thread::spawn(move || {
        while buffer.get().is_ok() {
          received.fetch_add(1, Ordering::Relaxed);
        }
      })
    })
    .collect();

  for producer in producers {
    producer.join().unwrap();
  }
  buffer.close().unwrap();
  for consumer in consumers {
    consumer.join().unwrap();
  }

  assert_eq!(received.load(Ordering::Relaxed), total);
  assert_eq!(violations.load(Ordering::Relaxed), 0);
  assert!(observed_full.load(Ordering::Relaxed));
  assert!(buffer.is_empty());
}

#[test]
fn mixed_timeouts_and_blocking_calls_lose_nothing() {
  let buffer = BoundedBuffer::new(2).unwrap();
  let total = ITEMS_MEDIUM;

  // A producer that keeps retrying timed-out puts must still deliver everything.
  let producer = {
    let buffer = buffer.clone();
    thread::spawn(move || {
      for i in 0..total {
        let mut value = i;
        loop {
          match buffer.put_timeout(value, SHORT_TIMEOUT / 10) {
            Ok(()) => break,
            Err(e) => value = e.into_inner(),
          }
        }
      }
    })
  };

  let mut received = Vec::with_capacity(total);
  while received.len() < total {
    if let Ok(value) = buffer.get_timeout(SHORT_TIMEOUT / 10) {
      received.push(value);
    }
  }
  producer.join().unwrap();
  assert_eq!(received, (0..total).collect::<Vec<_>>());
}
