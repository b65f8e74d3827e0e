//! Error types returned when receiving from a [`Listener`](crate::Listener).
//!
//! Flows themselves have no fallible operations: mutating a closed flow is
//! silently absorbed. The only failures are consumer-side outcomes:
//!
//! - [`TryRecvError`] — non-blocking receive found nothing, or the listener ended.
//! - [`RecvError`] — bounded wait expired, or the listener ended.
//!
//! Both types provide `as_label` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by [`Listener::try_recv`](crate::Listener::try_recv).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryRecvError {
    /// No value is available yet; the listener is still live.
    #[error("no value available yet")]
    Empty,

    /// The listener has ended: the flow was closed or the token was cancelled.
    #[error("listener closed")]
    Closed,
}

impl TryRecvError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use flowcast::TryRecvError;
    ///
    /// assert_eq!(TryRecvError::Empty.as_label(), "recv_empty");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TryRecvError::Empty => "recv_empty",
            TryRecvError::Closed => "recv_closed",
        }
    }

    /// True if the listener will never produce another value.
    pub fn is_closed(&self) -> bool {
        matches!(self, TryRecvError::Closed)
    }
}

/// # Errors produced by [`Listener::recv_timeout`](crate::Listener::recv_timeout).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvError {
    /// No value arrived within the given duration; the listener is still live.
    #[error("no value within {timeout:?}")]
    Timeout {
        /// The duration that elapsed.
        timeout: Duration,
    },

    /// The listener has ended: the flow was closed or the token was cancelled.
    #[error("listener closed")]
    Closed,
}

impl RecvError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use flowcast::RecvError;
    /// use std::time::Duration;
    ///
    /// let err = RecvError::Timeout { timeout: Duration::from_millis(5) };
    /// assert_eq!(err.as_label(), "recv_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RecvError::Timeout { .. } => "recv_timeout",
            RecvError::Closed => "recv_closed",
        }
    }

    /// True if the listener will never produce another value.
    pub fn is_closed(&self) -> bool {
        matches!(self, RecvError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(TryRecvError::Empty.as_label(), "recv_empty");
        assert_eq!(TryRecvError::Closed.as_label(), "recv_closed");
        assert_eq!(
            RecvError::Timeout {
                timeout: Duration::from_secs(1)
            }
            .as_label(),
            "recv_timeout"
        );
        assert_eq!(RecvError::Closed.as_label(), "recv_closed");
    }

    #[test]
    fn test_display() {
        let err = RecvError::Timeout {
            timeout: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "no value within 250ms");
        assert_eq!(TryRecvError::Closed.to_string(), "listener closed");
        assert!(RecvError::Closed.is_closed());
        assert!(!TryRecvError::Empty.is_closed());
    }
}
