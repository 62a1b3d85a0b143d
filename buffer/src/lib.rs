#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! A monitor-style bounded blocking buffer for Rust.
//!
//! `fibre_buffer` provides [`BoundedBuffer`], a fixed-capacity FIFO queue shared
//! by any number of producers and consumers. Producers block while it is full,
//! consumers block while it is empty, and every check, mutation and wakeup runs
//! under a single lock paired with "not full" / "not empty" condition
//! variables. Blocking and async callers can share one buffer.
//!
//! ```
//! use fibre_buffer::BoundedBuffer;
//! use std::thread;
//!
//! let buffer = BoundedBuffer::new(2).unwrap();
//! let producer = {
//!   let buffer = buffer.clone();
//!   thread::spawn(move || {
//!     for i in 0..5 {
//!       buffer.put(i).unwrap();
//!     }
//!   })
//! };
//!
//! let received: Vec<i32> = (0..5).map(|_| buffer.get().unwrap()).collect();
//! producer.join().unwrap();
//! assert_eq!(received, vec![0, 1, 2, 3, 4]);
//! ```

pub mod bounded;
pub mod builder;
pub mod cancel;
pub mod error;
pub mod observer;
pub mod telemetry;

pub use bounded::{BoundedBuffer, GetFuture, GetStream, Iter, PutFuture};
pub use builder::BufferBuilder;
pub use cancel::CancelToken;
pub use error::{
  BuildError, CloseError, GetError, GetTimeoutError, PutError, PutTimeoutError, TryGetError, TryPutError,
};
pub use observer::{BufferEvent, BufferObserver, Operation};

// Helper function to check if a type is Send + Sync.
// Useful for static assertions in generic code.
#[allow(dead_code)]
fn assert_send_sync<T: Send + Sync>() {}

#[allow(dead_code)]
fn handles_are_send_sync() {
  assert_send_sync::<BoundedBuffer<String>>();
  assert_send_sync::<CancelToken>();
}
