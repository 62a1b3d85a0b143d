// src/error.rs

//! Error types returned by buffer operations.

use core::fmt;

// Value-carrying errors hand the rejected item back to the caller. The macro
// generates `into_inner`, `Display`, `Debug` and `Error` without requiring
// `T: Debug`, so errors for opaque payloads can still be printed and boxed.
macro_rules! impl_error_for_enum_with_inner {
    (
        $enum_name:ident < $generic_param:ident >,
        $($variant:ident ( $message:expr ) ),+
        $(,)?
    ) => {
        impl<$generic_param> $enum_name<$generic_param> {
            /// Consumes the error, returning the value that could not be put.
            #[inline]
            pub fn into_inner(self) -> $generic_param {
                match self {
                    $( $enum_name::$variant(v) => v, )+
                }
            }
        }

        impl<$generic_param> fmt::Debug for $enum_name<$generic_param> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( $enum_name::$variant(_) => {
                        f.write_str(concat!(stringify!($enum_name), "::", stringify!($variant), "(..)"))
                    } )+
                }
            }
        }

        impl<$generic_param> fmt::Display for $enum_name<$generic_param> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( $enum_name::$variant(_) => f.write_str($message), )+
                }
            }
        }

        impl<$generic_param> std::error::Error for $enum_name<$generic_param> {}
    };
}

/// Error returned by the blocking `put` operations.
#[derive(PartialEq, Eq, Clone)]
pub enum PutError<T> {
  /// The buffer was closed. The item is returned.
  Closed(T),
  /// The wait was interrupted through a [`CancelToken`](crate::CancelToken).
  /// The buffer is left untouched and the item is returned.
  Cancelled(T),
}

impl_error_for_enum_with_inner!(
  PutError<T>,
  Closed("buffer closed"),
  Cancelled("put cancelled while waiting for space"),
);

/// Error returned by `try_put` when the item could not be stored immediately.
#[derive(PartialEq, Eq, Clone)]
pub enum TryPutError<T> {
  /// The buffer is at capacity.
  Full(T),
  /// The buffer was closed.
  Closed(T),
}

impl_error_for_enum_with_inner!(
  TryPutError<T>,
  Full("buffer full"),
  Closed("buffer closed"),
);

/// Error returned by `put_timeout`.
#[derive(PartialEq, Eq, Clone)]
pub enum PutTimeoutError<T> {
  /// No space became available before the timeout elapsed.
  Timeout(T),
  /// The buffer was closed.
  Closed(T),
}

impl_error_for_enum_with_inner!(
  PutTimeoutError<T>,
  Timeout("put operation timed out"),
  Closed("buffer closed"),
);

/// Error returned by the blocking `get` operations.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum GetError {
  /// The buffer is closed and every buffered item has been taken.
  Closed,
  /// The wait was interrupted through a [`CancelToken`](crate::CancelToken).
  Cancelled,
}
impl std::error::Error for GetError {}
impl fmt::Display for GetError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GetError::Closed => write!(f, "buffer closed (empty and no further puts accepted)"),
      GetError::Cancelled => write!(f, "get cancelled while waiting for an item"),
    }
  }
}

/// Error returned by `try_get` when no item could be taken immediately.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryGetError {
  /// No item is buffered right now.
  Empty,
  /// The buffer is closed and every buffered item has been taken.
  Closed,
}
impl std::error::Error for TryGetError {}
impl fmt::Display for TryGetError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TryGetError::Empty => write!(f, "buffer empty"),
      TryGetError::Closed => write!(f, "buffer closed (empty and no further puts accepted)"),
    }
  }
}

/// Error returned by `get_timeout`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum GetTimeoutError {
  /// The timeout elapsed before an item became available.
  Timeout,
  /// The buffer is closed and every buffered item has been taken.
  Closed,
}
impl std::error::Error for GetTimeoutError {}
impl fmt::Display for GetTimeoutError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GetTimeoutError::Timeout => write!(f, "get operation timed out"),
      GetTimeoutError::Closed => write!(f, "buffer closed"),
    }
  }
}

/// Error returned when attempting to close an already closed buffer.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CloseError;
impl std::error::Error for CloseError {}
impl fmt::Display for CloseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "buffer is already closed")
  }
}

/// Errors that can occur when building a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
  /// The buffer was configured with a capacity of zero. A bounded buffer
  /// must be able to hold at least one item.
  ZeroCapacity,
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::ZeroCapacity => write!(f, "bounded buffer capacity cannot be zero"),
    }
  }
}

impl std::error::Error for BuildError {}
