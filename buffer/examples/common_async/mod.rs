// examples/common_async/mod.rs
use std::future::Future;
use tokio::runtime::Runtime;

/// Helper to run a simple async main function.
pub fn run_async<F, T>(future: F) -> T
where
  F: Future<Output = T> + Send,
  T: Send,
{
  let rt = Runtime::new().expect("Failed to create Tokio runtime");
  rt.block_on(future)
}
