//! Modem driver contract.
//!
//! The facade never talks to the modem hardware directly; it goes through
//! this trait, which mirrors the command/response surface of an ESP8266-class
//! AT-command driver. The driver is injected at construction and must
//! outlive the facade.
//!
//! Operations that the modem acknowledges with OK/ERROR return a plain
//! success flag; classifying failures is the facade's job.

use std::time::Duration;

/// Command/response interface to the WiFi/TCP modem.
pub trait ModemDriver {
    /// Open a single TCP session to `host:port`.
    ///
    /// `host` is either a hostname or a dotted-decimal IP address.
    fn open_session(&mut self, host: &str, port: u16) -> bool;

    /// Tear down the current TCP session.
    fn close_session(&mut self) -> bool;

    /// Send a byte buffer over the open session.
    ///
    /// Best effort: the modem reports no partial-length information.
    fn send(&mut self, data: &[u8]) -> bool;

    /// Bulk-receive up to `buf.len()` bytes, waiting at most `timeout`.
    ///
    /// Returns the number of bytes actually written into `buf`; 0 on
    /// timeout or error.
    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> usize;

    /// Non-blocking poll: does the modem hold received data not yet
    /// collected via [`receive`](Self::receive)?
    fn data_pending(&mut self) -> bool;

    /// The modem's reported local IP address as dotted-decimal text.
    fn local_ip(&mut self) -> String;

    /// Firmware version string. Diagnostic only.
    fn firmware_version(&mut self) -> String;

    /// Put the modem into station (client) operating mode.
    fn set_station_mode(&mut self) -> bool;

    /// Associate with an access point.
    fn join_access_point(&mut self, ssid: &str, passphrase: &str) -> bool;

    /// Disable connection multiplexing, restricting the modem to a single
    /// session.
    fn disable_multiplexing(&mut self) -> bool;
}
