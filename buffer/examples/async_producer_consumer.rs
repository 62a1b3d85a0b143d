// examples/async_producer_consumer.rs
//
// The producer/consumer session on tokio tasks, plus a blocking producer
// feeding an async consumer through the same buffer.
use fibre_buffer::BoundedBuffer;
use futures_util::StreamExt;
use std::{thread, time::Duration};

mod common_async;

const CAPACITY: usize = 10;
const ENTRIES: usize = 20;

async fn async_session() {
  println!("--- Async Producer, Async Consumer ---");
  let buffer = BoundedBuffer::new(CAPACITY).expect("capacity is non-zero");

  let producer = {
    let buffer = buffer.clone();
    tokio::spawn(async move {
      for i in 0..ENTRIES {
        let entry = format!("Entry {}", i);
        println!("[Async Producer] Putting: {}", entry);
        if buffer.put_async(entry).await.is_err() {
          println!("[Async Producer] Buffer closed.");
          break;
        }
      }
    })
  };

  let consumer = {
    let buffer = buffer.clone();
    tokio::spawn(async move {
      for _ in 0..ENTRIES {
        tokio::time::sleep(Duration::from_millis(100)).await;
        match buffer.get_async().await {
          Ok(entry) => println!("[Async Consumer] Got: {}", entry),
          Err(e) => {
            println!("[Async Consumer] {}", e);
            break;
          }
        }
      }
    })
  };

  producer.await.expect("producer task panicked");
  consumer.await.expect("consumer task panicked");
}

async fn mixed_session() {
  println!("\n--- Sync Producer, Async Stream Consumer ---");
  let buffer = BoundedBuffer::new(2).expect("capacity is non-zero");

  let producer = {
    let buffer = buffer.clone();
    thread::spawn(move || {
      for i in 0..5 {
        println!("[Sync Producer] Putting: {}", i);
        buffer.put(i).expect("buffer closed early");
        thread::sleep(Duration::from_millis(20));
      }
      buffer.close().expect("closed twice");
    })
  };

  let mut stream = buffer.stream();
  while let Some(value) = stream.next().await {
    println!("[Stream Consumer] Got: {}", value);
  }
  println!("[Stream Consumer] Buffer closed and drained.");
  producer.join().expect("producer panicked");
}

fn main() {
  common_async::run_async(async {
    async_session().await;
    mixed_session().await;
  });
}
