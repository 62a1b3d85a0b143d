mod common;
use common::*;

use fibre_buffer::{BoundedBuffer, GetError};
use futures_util::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn async_smoke() {
  let buffer = BoundedBuffer::new(1).unwrap();
  buffer.put_async(10).await.unwrap();
  assert_eq!(buffer.get_async().await.unwrap(), 10);
}

#[tokio::test]
async fn async_get_waits_for_put() {
  let buffer = BoundedBuffer::new(4).unwrap();
  let handle = {
    let buffer = buffer.clone();
    tokio::spawn(async move {
      tokio::time::sleep(SHORT_TIMEOUT).await;
      buffer.put_async("hello").await.unwrap();
    })
  };
  assert_eq!(buffer.get_async().await.unwrap(), "hello");
  handle.await.unwrap();
}

#[tokio::test]
async fn producer_consumer_session_on_tasks() {
  let buffer = BoundedBuffer::new(10).unwrap();
  let producer = {
    let buffer = buffer.clone();
    tokio::spawn(async move {
      for i in 0..20 {
        buffer.put_async(format!("Entry {}", i)).await.unwrap();
      }
    })
  };

  let consumer = {
    let buffer = buffer.clone();
    tokio::spawn(async move {
      let mut received = Vec::new();
      for _ in 0..20 {
        received.push(buffer.get_async().await.unwrap());
      }
      received
    })
  };

  producer.await.unwrap();
  let received = consumer.await.unwrap();
  let expected: Vec<String> = (0..20).map(|i| format!("Entry {}", i)).collect();
  assert_eq!(received, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn async_multi_producer_stress() {
  let buffer = BoundedBuffer::new(16).unwrap();
  let num_producers = 8;
  let items_per_producer = ITEMS_HIGH;
  let total_items = num_producers * items_per_producer;
  let sum = Arc::new(AtomicUsize::new(0));

  let mut handles = Vec::new();
  for _ in 0..num_producers {
    let buffer = buffer.clone();
    handles.push(tokio::spawn(async move {
      for i in 1..=items_per_producer {
        buffer.put_async(i).await.unwrap();
      }
    }));
  }

  let consumer_handle = {
    let buffer = buffer.clone();
    let sum = sum.clone();
    tokio::spawn(async move {
      for _ in 0..total_items {
        sum.fetch_add(buffer.get_async().await.unwrap(), Ordering::Relaxed);
      }
    })
  };

  for handle in handles {
    handle.await.unwrap();
  }
  tokio::time::timeout(STRESS_TIMEOUT, consumer_handle)
    .await
    .expect("consumer stalled")
    .unwrap();

  let expected_sum = num_producers * (items_per_producer * (items_per_producer + 1) / 2);
  assert_eq!(sum.load(Ordering::Relaxed), expected_sum);
}

#[tokio::test]
async fn stream_drains_then_ends() {
  let buffer = BoundedBuffer::new(4).unwrap();
  let producer = {
    let buffer = buffer.clone();
    tokio::spawn(async move {
      for i in 0..ITEMS_LOW {
        buffer.put_async(i).await.unwrap();
      }
      buffer.close().unwrap();
    })
  };

  let collected: Vec<usize> = buffer.stream().collect().await;
  producer.await.unwrap();
  assert_eq!(collected, (0..ITEMS_LOW).collect::<Vec<_>>());
  assert_eq!(buffer.get_async().await, Err(GetError::Closed));
}

#[tokio::test]
async fn sync_producer_to_async_consumer() {
  let buffer = BoundedBuffer::new(2).unwrap();
  let sync_buffer = buffer.clone();

  let producer_handle = tokio::task::spawn_blocking(move || {
    for i in 0..ITEMS_LOW {
      sync_buffer.put(i).unwrap();
    }
  });

  for expected in 0..ITEMS_LOW {
    assert_eq!(buffer.get_async().await.unwrap(), expected);
  }
  producer_handle.await.unwrap();
}

#[tokio::test]
async fn timed_out_async_get_does_not_lose_items() {
  let buffer = BoundedBuffer::new(2).unwrap();
  let result = tokio::time::timeout(SHORT_TIMEOUT, buffer.get_async()).await;
  assert!(result.is_err());

  buffer.put_async(1).await.unwrap();
  assert_eq!(buffer.get_async().await.unwrap(), 1);
}
