//! Error types for the client facade.
//!
//! The modem driver itself only reports boolean success flags; these kinds
//! classify what went wrong at the facade level. Recoverable session
//! failures (open/close/send) are never raised to the caller — they show up
//! as state transitions plus an error-counter increment, and the kinds here
//! are used for logging and for operations with a `Result` contract
//! (`peek`, `read`, `setup`, the explicitly-unimplemented operations).

use std::fmt;

/// Errors reported by the client facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// A TCP operation was attempted before WLAN association succeeded.
    DriverUnavailable,
    /// WLAN association did not succeed within the retry budget.
    AssociationFailed {
        /// Number of association cycles that were attempted.
        attempts: u32,
    },
    /// The driver failed to open a TCP session.
    SessionOpenFailed,
    /// The driver failed to close the TCP session.
    SessionCloseFailed,
    /// `peek`/`read` on an exhausted receive buffer.
    BufferEmpty,
    /// Invalid configuration parameter.
    InvalidConfig(&'static str),
    /// Operation that deliberately has no implementation.
    Unimplemented(&'static str),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DriverUnavailable => write!(f, "WLAN not associated, driver unavailable"),
            Self::AssociationFailed { attempts } => {
                write!(f, "WLAN association failed after {} attempt(s)", attempts)
            }
            Self::SessionOpenFailed => write!(f, "failed to open TCP session"),
            Self::SessionCloseFailed => write!(f, "failed to close TCP session"),
            Self::BufferEmpty => write!(f, "receive buffer empty"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
            Self::Unimplemented(op) => write!(f, "{} is not implemented", op),
        }
    }
}

impl std::error::Error for ClientError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", ClientError::AssociationFailed { attempts: 3 }),
            "WLAN association failed after 3 attempt(s)"
        );
        assert_eq!(
            format!("{}", ClientError::BufferEmpty),
            "receive buffer empty"
        );
        assert_eq!(
            format!("{}", ClientError::InvalidConfig("capacity must be greater than 0")),
            "invalid config: capacity must be greater than 0"
        );
        assert_eq!(
            format!("{}", ClientError::Unimplemented("flush")),
            "flush is not implemented"
        );
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(
            ClientError::AssociationFailed { attempts: 2 },
            ClientError::AssociationFailed { attempts: 2 }
        );
        assert_ne!(
            ClientError::SessionOpenFailed,
            ClientError::SessionCloseFailed
        );
    }
}
