//! Stream-style client facade.
//!
//! [`EspClient`] composes the WLAN association loop, the TCP session state
//! machine, and the bounded receive buffer behind a small stream-client
//! surface, split into three capability traits: [`Connectable`],
//! [`Readable`] and [`Writable`]. Callers depend on the capability they
//! need, not on the concrete type.
//!
//! Everything is synchronous and single-threaded: `setup` blocks for the
//! association retry budget, reads block for at most one buffer-fill
//! timeout, and connect/stop/write block for the underlying driver call.

use crate::buffer::{BufferConfig, RecvBuffer};
use crate::connection::{Connection, ErrorCounter};
use crate::driver::ModemDriver;
use crate::error::ClientError;
use crate::wlan::{Association, Credentials, RetryPolicy, WlanState};
use log::{trace, warn};
use std::net::Ipv4Addr;

/// TCP connection management capability.
pub trait Connectable {
    /// Open a TCP session to an IP address. Returns the post-call value of
    /// [`connected`](Connectable::connected).
    fn connect_ip(&mut self, addr: Ipv4Addr, port: u16) -> bool;

    /// Open a TCP session to a hostname. Returns the post-call value of
    /// [`connected`](Connectable::connected).
    fn connect_host(&mut self, host: &str, port: u16) -> bool;

    /// True iff a TCP session is currently open.
    fn connected(&self) -> bool;

    /// Close the TCP session.
    fn stop(&mut self);
}

/// Byte-stream read capability.
pub trait Readable {
    /// True iff a byte can be read right now, refilling the receive buffer
    /// from the driver when it is exhausted and data is pending.
    fn available(&mut self) -> bool;

    /// The next byte without consuming it.
    ///
    /// # Errors
    ///
    /// [`ClientError::BufferEmpty`] when the buffer is exhausted.
    fn peek(&mut self) -> Result<u8, ClientError>;

    /// The next byte, consuming it.
    ///
    /// # Errors
    ///
    /// [`ClientError::BufferEmpty`] when the buffer is exhausted.
    fn read(&mut self) -> Result<u8, ClientError>;

    /// Bulk read into a caller buffer. Deliberately not implemented.
    ///
    /// # Errors
    ///
    /// Always [`ClientError::Unimplemented`].
    fn read_buf(&mut self, buf: &mut [u8]) -> Result<usize, ClientError>;
}

/// Byte-stream write capability.
pub trait Writable {
    /// Forward a byte range to the driver's send primitive.
    ///
    /// Returns `data.len()` on driver success and on driver failure alike;
    /// a failure additionally increments the error counter. The modem
    /// reports no partial-length information, so a length return cannot be
    /// trusted as a delivery receipt.
    fn write(&mut self, data: &[u8]) -> usize;

    /// Flush buffered output. Deliberately not implemented; the facade
    /// buffers no output.
    ///
    /// # Errors
    ///
    /// Always [`ClientError::Unimplemented`].
    fn flush(&mut self) -> Result<(), ClientError>;
}

/// Client facade over an injected [`ModemDriver`].
///
/// The driver reference is injected at construction and must outlive the
/// client. [`setup`](EspClient::setup) must complete successfully before
/// any TCP operation; earlier TCP calls are refused.
pub struct EspClient<'d, D: ModemDriver> {
    driver: &'d mut D,
    credentials: Option<Credentials>,
    association: Association,
    connection: Connection,
    buffer: RecvBuffer,
    errors: ErrorCounter,
}

impl<'d, D: ModemDriver> EspClient<'d, D> {
    /// Create a client with default retry policy and buffer configuration.
    pub fn new(driver: &'d mut D) -> Self {
        Self {
            driver,
            credentials: None,
            association: Association::default(),
            connection: Connection::new(),
            buffer: RecvBuffer::default(),
            errors: ErrorCounter::default(),
        }
    }

    /// Create a client with explicit retry policy and buffer configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either configuration is invalid.
    pub fn with_config(
        driver: &'d mut D,
        policy: RetryPolicy,
        buffer: BufferConfig,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            driver,
            credentials: None,
            association: Association::new(policy)?,
            connection: Connection::new(),
            buffer: RecvBuffer::new(buffer)?,
            errors: ErrorCounter::default(),
        })
    }

    /// Store the access point credentials and run the WLAN association loop
    /// to completion, blocking for backoff sleeps in between cycles.
    ///
    /// # Errors
    ///
    /// [`ClientError::AssociationFailed`] once the retry budget is
    /// exhausted; the credentials stay stored and a later `setup` retries
    /// with them.
    pub fn setup(&mut self, ssid: &str, passphrase: &str) -> Result<(), ClientError> {
        let credentials = Credentials::new(ssid, passphrase);
        let result = self
            .association
            .run(&mut *self.driver, &credentials, &mut self.errors);
        self.credentials = Some(credentials);
        result
    }

    /// Current WLAN state.
    pub fn status(&self) -> WlanState {
        self.association.state()
    }

    /// The modem's local IP address, parsed from its reported text.
    ///
    /// `None` when no TCP session exists or the reported text does not
    /// parse as an address.
    pub fn local_ip(&mut self) -> Option<Ipv4Addr> {
        if !self.connected() {
            return None;
        }
        let text = self.driver.local_ip();
        match text.parse() {
            Ok(ip) => Some(ip),
            Err(e) => {
                warn!("failed to parse local IP '{}': {}", text, e);
                None
            }
        }
    }

    /// Failed driver operations since the last fully successful association
    /// cycle.
    pub fn error_count(&self) -> u32 {
        self.errors.count()
    }

    /// Association cycles attempted so far. Purely informative.
    pub fn setup_count(&self) -> u32 {
        self.association.setup_count()
    }

    /// SSID stored by the last [`setup`](EspClient::setup) call, if any.
    pub fn ssid(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.ssid())
    }

    /// Readiness query. Deliberately not implemented; use
    /// [`status`](EspClient::status) and
    /// [`connected`](Connectable::connected) instead.
    ///
    /// # Errors
    ///
    /// Always [`ClientError::Unimplemented`].
    pub fn ready(&self) -> Result<bool, ClientError> {
        Err(ClientError::Unimplemented("readiness query"))
    }

    fn wlan_ready(&self) -> bool {
        self.association.state() == WlanState::Connected
    }

    fn refuse(&self, operation: &str) {
        warn!(
            "refusing {}: {}",
            operation,
            ClientError::DriverUnavailable
        );
    }
}

impl<'d, D: ModemDriver> Connectable for EspClient<'d, D> {
    fn connect_ip(&mut self, addr: Ipv4Addr, port: u16) -> bool {
        self.connect_host(&dotted_decimal(addr.octets()), port)
    }

    fn connect_host(&mut self, host: &str, port: u16) -> bool {
        if !self.wlan_ready() {
            self.refuse("connect");
            return false;
        }
        if let Err(e) = self
            .connection
            .open(&mut *self.driver, host, port, &mut self.errors)
        {
            warn!("connect to {}:{} failed: {}", host, port, e);
        }
        self.connection.is_connected()
    }

    fn connected(&self) -> bool {
        self.connection.is_connected()
    }

    fn stop(&mut self) {
        if !self.wlan_ready() {
            self.refuse("stop");
            return;
        }
        if let Err(e) = self.connection.close(&mut *self.driver, &mut self.errors) {
            warn!("stop failed: {}", e);
        }
    }
}

impl<'d, D: ModemDriver> Readable for EspClient<'d, D> {
    fn available(&mut self) -> bool {
        if !self.wlan_ready() {
            return false;
        }
        self.buffer.available(&mut *self.driver)
    }

    fn peek(&mut self) -> Result<u8, ClientError> {
        self.buffer.peek()
    }

    fn read(&mut self) -> Result<u8, ClientError> {
        self.buffer.read()
    }

    fn read_buf(&mut self, _buf: &mut [u8]) -> Result<usize, ClientError> {
        Err(ClientError::Unimplemented("bulk read"))
    }
}

impl<'d, D: ModemDriver> Writable for EspClient<'d, D> {
    fn write(&mut self, data: &[u8]) -> usize {
        if !self.wlan_ready() {
            self.refuse("write");
            return 0;
        }
        if self.driver.send(data) {
            trace!("sent {} bytes", data.len());
        } else {
            warn!("send of {} bytes failed", data.len());
            self.errors.increment();
        }
        data.len()
    }

    fn flush(&mut self) -> Result<(), ClientError> {
        Err(ClientError::Unimplemented("flush"))
    }
}

/// Render four octets as canonical dotted decimal: 1-3 ASCII digits per
/// octet, no leading zeros, octets separated by `.`.
fn dotted_decimal(octets: [u8; 4]) -> String {
    let mut out = String::with_capacity(15);
    for (i, octet) in octets.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        let mut value = *octet;
        let mut divisor = 100;
        let mut emitting = false;
        while divisor > 1 {
            if value >= divisor || emitting {
                out.push((b'0' + value / divisor) as char);
                value %= divisor;
                emitting = true;
            }
            divisor /= 10;
        }
        out.push((b'0' + value) as char);
    }
    out
}
