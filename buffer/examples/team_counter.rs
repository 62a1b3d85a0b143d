// examples/team_counter.rs
//
// Four workers increment one shared counter 100 000 times each. The counter is
// guarded by a lock, so the total after joining every worker is exact.
use parking_lot::Mutex;
use std::{sync::Arc, thread};

const WORKERS: usize = 4;
const INCREMENTS: usize = 100_000;

#[derive(Debug, Default)]
struct Counter {
  value: Mutex<usize>,
}

impl Counter {
  fn increment(&self) {
    *self.value.lock() += 1;
  }

  fn value(&self) -> usize {
    *self.value.lock()
  }
}

fn main() {
  let counter = Arc::new(Counter::default());

  let workers: Vec<_> = (0..WORKERS)
    .map(|id| {
      let counter = Arc::clone(&counter);
      thread::spawn(move || {
        for _ in 0..INCREMENTS {
          counter.increment();
        }
        println!("[Worker {}] finished", id);
      })
    })
    .collect();

  for worker in workers {
    worker.join().expect("worker panicked");
  }

  let total = counter.value();
  println!("Total: {}", total);
  assert_eq!(total, WORKERS * INCREMENTS);
}
