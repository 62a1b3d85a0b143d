// src/telemetry.rs

//! Debug instrumentation for buffer waits, timeouts, cancellations and closes.
//!
//! With the `buffer_telemetry` feature, events and counters go to a global
//! collector that tests and examples can inspect or print. Without it every
//! function here is an empty inline stub.

/// The recording implementation, compiled with `buffer_telemetry`.
#[cfg(feature = "buffer_telemetry")]
pub mod enabled {
  use std::collections::HashMap;
  use std::fmt;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::thread::{self, ThreadId};
  use std::time::Instant;

  use parking_lot::Mutex;
  use tokio::task::Id as TokioTaskId;

  static NEXT_EVENT_SEQUENCE_ID: AtomicUsize = AtomicUsize::new(0);

  /// One recorded event.
  #[derive(Clone)]
  pub struct TelemetryEvent {
    /// Global recording order.
    pub seq_id: usize,
    /// When the event was recorded.
    pub timestamp: Instant,
    /// The thread that recorded it.
    pub os_thread_id: ThreadId,
    /// The tokio task that recorded it, if any.
    pub tokio_task_id: Option<TokioTaskId>,
    /// Buffer length at the time of the event.
    pub len: Option<usize>,
    /// The operation that recorded it, such as `BoundedBuffer::put`.
    pub location: String,
    /// The kind of event, such as `PutBlocked`.
    pub event_type: String,
    /// Free-form detail.
    pub message: Option<String>,
  }

  impl fmt::Debug for TelemetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("TelemetryEvent")
        .field("seq", &self.seq_id)
        .field("os_tid", &self.os_thread_id)
        .field("tokio_tid", &self.tokio_task_id.map(|id| id.to_string()).as_deref().unwrap_or("N/A"))
        .field("len", &self.len)
        .field("loc", &self.location)
        .field("evt", &self.event_type)
        .field("msg", &self.message.as_deref().unwrap_or(""))
        .finish()
    }
  }

  type CounterKey = (String, String); // (location, counter_name)

  struct CollectorData {
    events: Vec<TelemetryEvent>,
    counters: HashMap<CounterKey, usize>,
    start_time: Instant,
  }

  impl CollectorData {
    fn new() -> Self {
      CollectorData {
        events: Vec::new(),
        counters: HashMap::new(),
        start_time: Instant::now(),
      }
    }
  }

  lazy_static::lazy_static! {
      static ref GLOBAL_COLLECTOR: Mutex<CollectorData> = Mutex::new(CollectorData::new());
  }

  /// Records one event in the global collector.
  pub fn log_event_fn(len: Option<usize>, location: &str, event_type: &str, message: Option<String>) {
    let event = TelemetryEvent {
      seq_id: NEXT_EVENT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed),
      timestamp: Instant::now(),
      os_thread_id: thread::current().id(),
      tokio_task_id: tokio::task::try_id(),
      len,
      location: location.to_string(),
      event_type: event_type.to_string(),
      message,
    };
    GLOBAL_COLLECTOR.lock().events.push(event);
  }

  /// Adds one to the counter `counter_name` of `location`.
  pub fn increment_counter_fn(location: &str, counter_name: &str) {
    let key = (location.to_string(), counter_name.to_string());
    *GLOBAL_COLLECTOR.lock().counters.entry(key).or_insert(0) += 1;
  }

  /// Returns the current value of a counter, or zero if it was never incremented.
  pub fn counter_value_fn(location: &str, counter_name: &str) -> usize {
    let key = (location.to_string(), counter_name.to_string());
    GLOBAL_COLLECTOR.lock().counters.get(&key).copied().unwrap_or(0)
  }

  /// Returns how many events of `event_type` have been recorded.
  pub fn event_count_fn(event_type: &str) -> usize {
    GLOBAL_COLLECTOR
      .lock()
      .events
      .iter()
      .filter(|e| e.event_type == event_type)
      .count()
  }

  /// Prints every recorded event and counter to stdout.
  pub fn print_telemetry_report_fn() {
    let collector = GLOBAL_COLLECTOR.lock();
    println!("\n--- Buffer Telemetry Report (Feature: buffer_telemetry) ---");
    println!("Report generated at: {:?}", Instant::now());
    println!("Collection started at: {:?}", collector.start_time);

    if collector.events.is_empty() {
      println!("\n[Events] No detailed events recorded.");
    } else {
      println!("\n[Events] Recorded Events ({}):", collector.events.len());
      let mut sorted_events = collector.events.clone();
      sorted_events.sort_by_key(|e| e.seq_id);

      for event in sorted_events.iter() {
        let time_since_start = event.timestamp.duration_since(collector.start_time);
        let os_tid_short = format!("{:?}", event.os_thread_id)
          .trim_start_matches("ThreadId(")
          .trim_end_matches(')')
          .to_string();
        let tokio_tid_str = event.tokio_task_id.map(|id| id.to_string()).unwrap_or_else(|| "---".to_string());

        println!(
          "  +{:<10.6}s [Seq:{:<5}] OS_TID:{:<6} TaskID:{:<6} Len:{:<6} Loc:{:<25} Evt:{:<20} Msg: {}",
          time_since_start.as_secs_f64(),
          event.seq_id,
          os_tid_short,
          tokio_tid_str,
          event.len.map_or_else(|| "N/A".to_string(), |len| len.to_string()),
          event.location,
          event.event_type,
          event.message.as_deref().unwrap_or("")
        );
      }
    }

    if collector.counters.is_empty() {
      println!("\n[Counters] No counters recorded.");
    } else {
      println!("\n[Counters] Recorded Counters ({}):", collector.counters.len());
      let mut sorted_counters: Vec<_> = collector.counters.iter().collect();
      sorted_counters.sort_by_key(|(k, _v)| *k);
      for ((loc, name), count) in sorted_counters {
        println!("  Loc:{:<25} Counter:{:<20} Value: {}", loc, name, count);
      }
    }
    println!("\n--- End of Telemetry Report ---");
  }

  /// Discards everything recorded so far.
  pub fn clear_telemetry_fn() {
    let mut collector = GLOBAL_COLLECTOR.lock();
    collector.events.clear();
    collector.counters.clear();
    collector.start_time = Instant::now();
    NEXT_EVENT_SEQUENCE_ID.store(0, Ordering::Relaxed);
  }
} // mod enabled

/// No-op stand-ins used without `buffer_telemetry`.
#[cfg(not(feature = "buffer_telemetry"))]
pub mod disabled {
  /// Does nothing.
  #[inline(always)]
  pub fn log_event_fn(_len: Option<usize>, _location: &str, _event_type: &str, _message: Option<String>) {}
  /// Does nothing.
  #[inline(always)]
  pub fn increment_counter_fn(_location: &str, _counter_name: &str) {}
  /// Always zero.
  #[inline(always)]
  pub fn counter_value_fn(_location: &str, _counter_name: &str) -> usize {
    0
  }
  /// Always zero.
  #[inline(always)]
  pub fn event_count_fn(_event_type: &str) -> usize {
    0
  }
  /// Does nothing.
  #[inline(always)]
  pub fn print_telemetry_report_fn() {}
  /// Does nothing.
  #[inline(always)]
  pub fn clear_telemetry_fn() {}
}

// Re-export the correct set of functions based on the feature flag
#[cfg(feature = "buffer_telemetry")]
pub use enabled::{
  clear_telemetry_fn as clear_telemetry, counter_value_fn as counter_value, event_count_fn as event_count,
  increment_counter_fn as increment_counter, log_event_fn as log_event,
  print_telemetry_report_fn as print_telemetry_report,
};

#[cfg(not(feature = "buffer_telemetry"))]
pub use disabled::{
  clear_telemetry_fn as clear_telemetry, counter_value_fn as counter_value, event_count_fn as event_count,
  increment_counter_fn as increment_counter, log_event_fn as log_event,
  print_telemetry_report_fn as print_telemetry_report,
};

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn recording_accepts_borrowed_names() {
    let location = format!("BoundedBuffer::{}", "get");
    let counter = String::from("BorrowedName");

    increment_counter(&location, &counter);
    log_event(Some(0), &location, &counter, None);

    let expected = if cfg!(feature = "buffer_telemetry") { 1 } else { 0 };
    assert_eq!(counter_value(&location, &counter), expected);
    assert_eq!(event_count(&counter), expected);
  }
}
