// benches/bounded_sync.rs

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::{
  thread,
  time::{Duration, Instant},
};

use fibre_buffer::BoundedBuffer;

const ITEM_VALUE: u64 = 42;
const TOTAL_ITEMS: usize = 10_000;

// --- Config ---
#[derive(Debug, Clone, Copy)]
struct BoundedBenchConfig {
  capacity: usize,
  num_producers: usize,
  num_consumers: usize,
}

impl BoundedBenchConfig {
  fn label(&self) -> String {
    format!("Cap{}_P{}_C{}", self.capacity, self.num_producers, self.num_consumers)
  }
}

const CONFIGS: &[BoundedBenchConfig] = &[
  BoundedBenchConfig { capacity: 1, num_producers: 1, num_consumers: 1 },
  BoundedBenchConfig { capacity: 10, num_producers: 1, num_consumers: 1 },
  BoundedBenchConfig { capacity: 128, num_producers: 1, num_consumers: 1 },
  BoundedBenchConfig { capacity: 10, num_producers: 4, num_consumers: 1 },
  BoundedBenchConfig { capacity: 128, num_producers: 4, num_consumers: 4 },
];

// --- Measured Logic ---
fn run_once(cfg: BoundedBenchConfig) -> Duration {
  let buffer = BoundedBuffer::new(cfg.capacity).expect("capacity is non-zero");
  let per_producer = TOTAL_ITEMS / cfg.num_producers;
  let total = per_producer * cfg.num_producers;

  let start = Instant::now();
  let producers: Vec<_> = (0..cfg.num_producers)
    .map(|_| {
      let buffer = buffer.clone();
      thread::spawn(move || {
        for _ in 0..per_producer {
          buffer.put(ITEM_VALUE).expect("buffer closed during bench");
        }
      })
    })
    .collect();

  let consumers: Vec<_> = (0..cfg.num_consumers)
    .map(|_| {
      let buffer = buffer.clone();
      thread::spawn(move || buffer.iter().count())
    })
    .collect();

  for producer in producers {
    producer.join().expect("producer panicked");
  }
  buffer.close().expect("closed twice");
  let received: usize = consumers.into_iter().map(|c| c.join().expect("consumer panicked")).sum();
  let elapsed = start.elapsed();

  assert_eq!(received, total);
  elapsed
}

fn bounded_sync_benches(c: &mut Criterion) {
  let mut group = c.benchmark_group("BoundedBufferSync");
  for cfg in CONFIGS {
    let items = (TOTAL_ITEMS / cfg.num_producers * cfg.num_producers) as u64;
    group.throughput(Throughput::Elements(items));
    group.bench_with_input(BenchmarkId::from_parameter(cfg.label()), cfg, |b, cfg| {
      b.iter_custom(|iters| (0..iters).map(|_| run_once(*cfg)).sum())
    });
  }
  group.finish();
}

criterion_group!(benches, bounded_sync_benches);
criterion_main!(benches);
