// Runs only with `--features buffer_telemetry`.
mod common;
use common::*;

use fibre_buffer::telemetry;
use fibre_buffer::{BoundedBuffer, Operation};
use serial_test::serial;
use std::thread;

#[test]
#[serial]
fn blocked_puts_and_gets_are_counted() {
  telemetry::clear_telemetry();

  let log = EventLog::default();
  let buffer = log.buffer(1);
  buffer.put(1).unwrap();

  let producer = {
    let buffer = buffer.clone();
    thread::spawn(move || buffer.put(2).unwrap())
  };
  log.wait_for_blocked(Operation::Put, 1);
  assert_eq!(buffer.get().unwrap(), 1);
  producer.join().unwrap();
  assert_eq!(buffer.get().unwrap(), 2);

  let consumer = {
    let buffer = buffer.clone();
    thread::spawn(move || buffer.get().unwrap())
  };
  log.wait_for_blocked(Operation::Get, 1);
  buffer.put(3).unwrap();
  assert_eq!(consumer.join().unwrap(), 3);

  assert!(telemetry::counter_value("BoundedBuffer::put", "Blocked") >= 1);
  assert!(telemetry::counter_value("BoundedBuffer::get", "Blocked") >= 1);
  assert!(telemetry::event_count("PutBlocked") >= 1);
}

#[test]
#[serial]
fn timeouts_and_close_are_recorded() {
  telemetry::clear_telemetry();

  let buffer = BoundedBuffer::<u8>::new(1).unwrap();
  assert!(buffer.get_timeout(SHORT_TIMEOUT).is_err());
  buffer.close().unwrap();

  assert_eq!(telemetry::counter_value("BoundedBuffer::get", "Timeout"), 1);
  assert_eq!(telemetry::event_count("Closed"), 1);
  telemetry::print_telemetry_report();
}
