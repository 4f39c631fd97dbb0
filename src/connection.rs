//! TCP session state tracking.
//!
//! One session at a time, tracked by a three-state machine. A failed open or
//! close lands the machine back in `Unknown`; there is no automatic
//! reconnection, the caller retries explicitly.

use crate::driver::ModemDriver;
use crate::error::ClientError;
use log::info;

/// State of the TCP session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Initial state, or the aftermath of a failed open/close.
    #[default]
    Unknown,
    /// Session open.
    Connected,
    /// Session closed cleanly.
    Disconnected,
}

/// Count of failed driver operations since the last fully successful WLAN
/// association cycle.
///
/// Purely informative; a growing count hints that the WLAN needs to be set
/// up again.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorCounter(u32);

impl ErrorCounter {
    /// Record one failed driver operation.
    pub fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    /// Reset to zero. Done exactly when an association cycle fully succeeds.
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Current count.
    pub fn count(&self) -> u32 {
        self.0
    }
}

/// TCP session state machine.
///
/// State changes only through [`open`](Connection::open) and
/// [`close`](Connection::close) outcomes; everything else reads it through
/// [`is_connected`](Connection::is_connected).
#[derive(Debug, Default)]
pub struct Connection {
    state: ConnectionState,
}

impl Connection {
    /// A session tracker in the initial `Unknown` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a TCP session to `host:port` via the driver.
    ///
    /// On success the state becomes `Connected`. On failure the state falls
    /// back to `Unknown` and `errors` is incremented.
    ///
    /// # Errors
    ///
    /// [`ClientError::SessionOpenFailed`] when the driver reports failure.
    pub fn open<D: ModemDriver>(
        &mut self,
        driver: &mut D,
        host: &str,
        port: u16,
        errors: &mut ErrorCounter,
    ) -> Result<(), ClientError> {
        info!("opening TCP session to {}:{}", host, port);
        if driver.open_session(host, port) {
            self.state = ConnectionState::Connected;
            Ok(())
        } else {
            self.state = ConnectionState::Unknown;
            errors.increment();
            Err(ClientError::SessionOpenFailed)
        }
    }

    /// Close the TCP session via the driver.
    ///
    /// On success the state becomes `Disconnected`. On failure the state
    /// falls back to `Unknown` and `errors` is incremented.
    ///
    /// # Errors
    ///
    /// [`ClientError::SessionCloseFailed`] when the driver reports failure.
    pub fn close<D: ModemDriver>(
        &mut self,
        driver: &mut D,
        errors: &mut ErrorCounter,
    ) -> Result<(), ClientError> {
        info!("closing TCP session");
        if driver.close_session() {
            self.state = ConnectionState::Disconnected;
            Ok(())
        } else {
            self.state = ConnectionState::Unknown;
            errors.increment();
            Err(ClientError::SessionCloseFailed)
        }
    }

    /// Pure query: true iff the session is open. No side effects.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Current session state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MockModem;

    #[test]
    fn test_initial_state_unknown() {
        let conn = Connection::new();
        assert_eq!(conn.state(), ConnectionState::Unknown);
        assert!(!conn.is_connected());
    }

    #[test]
    fn test_open_success() {
        let mut modem = MockModem::new();
        let mut conn = Connection::new();
        let mut errors = ErrorCounter::default();

        assert!(conn.open(&mut modem, "10.0.0.5", 80, &mut errors).is_ok());
        assert!(conn.is_connected());
        assert_eq!(conn.state(), ConnectionState::Connected);
        assert_eq!(errors.count(), 0);
        assert_eq!(modem.last_open, Some(("10.0.0.5".to_string(), 80)));
    }

    #[test]
    fn test_open_failure() {
        let mut modem = MockModem::new();
        modem.open_ok = false;
        let mut conn = Connection::new();
        let mut errors = ErrorCounter::default();

        let result = conn.open(&mut modem, "10.0.0.5", 80, &mut errors);
        assert_eq!(result, Err(ClientError::SessionOpenFailed));
        assert!(!conn.is_connected());
        assert_eq!(conn.state(), ConnectionState::Unknown);
        assert_eq!(errors.count(), 1);
    }

    #[test]
    fn test_close_success() {
        let mut modem = MockModem::new();
        let mut conn = Connection::new();
        let mut errors = ErrorCounter::default();

        conn.open(&mut modem, "example.com", 443, &mut errors)
            .unwrap();
        assert!(conn.close(&mut modem, &mut errors).is_ok());
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(!conn.is_connected());
        assert_eq!(errors.count(), 0);
    }

    #[test]
    fn test_close_failure() {
        let mut modem = MockModem::new();
        modem.close_ok = false;
        let mut conn = Connection::new();
        let mut errors = ErrorCounter::default();

        conn.open(&mut modem, "example.com", 443, &mut errors)
            .unwrap();
        let result = conn.close(&mut modem, &mut errors);
        assert_eq!(result, Err(ClientError::SessionCloseFailed));
        assert_eq!(conn.state(), ConnectionState::Unknown);
        assert_eq!(errors.count(), 1);
    }

    #[test]
    fn test_error_counter_saturates() {
        let mut errors = ErrorCounter(u32::MAX);
        errors.increment();
        assert_eq!(errors.count(), u32::MAX);
        errors.reset();
        assert_eq!(errors.count(), 0);
    }
}
