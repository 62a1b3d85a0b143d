// examples/producer_consumer.rs
//
// One producer thread puts twenty entries into a buffer of capacity ten while a
// slow consumer takes them out. The producer runs ahead until the buffer is
// full and then waits for the consumer. Run with `RUST_LOG=fibre_buffer=debug`
// to see the buffer's own log records.
use fibre_buffer::{BoundedBuffer, BufferEvent};
use std::{thread, time::Duration};
use tracing_subscriber::EnvFilter;

const CAPACITY: usize = 10;
const ENTRIES: usize = 20;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let buffer = BoundedBuffer::builder(CAPACITY)
    .name("entries")
    .observer(|event: BufferEvent| {
      if let BufferEvent::Blocked { op, len } = event {
        println!("  ({} waiting, {} buffered)", op, len);
      }
    })
    .build()
    .expect("capacity is non-zero");

  let producer = {
    let buffer = buffer.clone();
    thread::spawn(move || {
      for i in 0..ENTRIES {
        let entry = format!("Entry {}", i);
        println!("[Producer] Putting: {}", entry);
        if let Err(e) = buffer.put(entry) {
          println!("[Producer] Buffer closed, dropping {:?}", e.into_inner());
          break;
        }
      }
    })
  };

  let consumer = {
    let buffer = buffer.clone();
    thread::spawn(move || {
      for _ in 0..ENTRIES {
        thread::sleep(Duration::from_millis(100));
        match buffer.get() {
          Ok(entry) => println!("[Consumer] Got: {}", entry),
          Err(e) => {
            println!("[Consumer] {}", e);
            break;
          }
        }
      }
    })
  };

  producer.join().expect("producer panicked");
  consumer.join().expect("consumer panicked");
  println!("Done. {} items left in the buffer.", buffer.len());
}
