//! Error types for the event multiplexer.

use crate::codes::Category;
use thiserror::Error;

/// Result type alias for evmux operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while describing sources or distributing events.
#[derive(Debug, Error)]
pub enum Error {
    /// A capability index, event code or axis index is at or above the
    /// category maximum.
    #[error("{category} code {code:#x} out of range (limit {limit:#x})")]
    OutOfRange {
        /// Category the code was checked against.
        category: Category,
        /// The rejected code.
        code: u16,
        /// The category's exclusive upper bound.
        limit: u16,
    },

    /// The event type is not accepted by the push path.
    #[error("unsupported event type {0:#x}")]
    InvalidEventType(u16),

    /// A client ring buffer must hold at least one event.
    #[error("invalid client buffer capacity: {0}")]
    InvalidCapacity(usize),

    /// Another client already holds the exclusive grab.
    #[error("device is already grabbed")]
    Busy,

    /// Release was attempted without holding the grab.
    #[error("device is not grabbed by this client")]
    NotGrabbed,

    /// The client is not attached to this source.
    #[error("client {0} is not attached to this source")]
    UnknownClient(u64),

    /// The source has been unregistered.
    #[error("source is not registered")]
    Unregistered,

    /// The consumer-facing device node could not be created.
    #[error("failed to create device node: {0}")]
    NodeCreate(String),

    /// The driver refused to open the device for its first client.
    #[error("failed to open device: {0}")]
    DeviceOpen(String),

    /// File I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Recording (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Thread-related error.
    #[error("thread error: {0}")]
    ThreadError(String),

    /// A recorder is already capturing.
    #[error("recorder is already running")]
    AlreadyRunning,

    /// The recorder was stopped without being started.
    #[error("recorder is not running")]
    NotRunning,

    /// Other errors.
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn out_of_range(category: Category, code: u16) -> Self {
        Error::OutOfRange {
            category,
            code,
            limit: category.limit(),
        }
    }

    /// Whether this error reports a bad argument (as opposed to a state
    /// conflict or an environment failure).
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::OutOfRange { .. } | Error::InvalidEventType(_) | Error::InvalidCapacity(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = Error::out_of_range(Category::Key, 0x300);
        assert_eq!(err.to_string(), "key code 0x300 out of range (limit 0x300)");
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_state_errors_are_not_invalid_argument() {
        assert!(!Error::Busy.is_invalid_argument());
        assert!(!Error::NotGrabbed.is_invalid_argument());
        assert!(Error::InvalidEventType(0x15).is_invalid_argument());
    }
}
