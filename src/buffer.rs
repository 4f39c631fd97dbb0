//! Bounded receive buffer.
//!
//! The modem's receive primitive is a bulk fill with a bounded wait, so the
//! read path is wholesale-refill-then-drain: the buffer is refilled in one
//! driver call only once fully drained, then consumed byte by byte. This
//! avoids a modem round trip per byte.
//!
//! All accesses are bounds-checked; draining an exhausted buffer yields
//! [`ClientError::BufferEmpty`], never a stale byte.

use crate::driver::ModemDriver;
use crate::error::ClientError;
use log::{debug, trace};
use std::time::Duration;

/// Default buffer capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 100;

/// Default bounded wait for one bulk fill.
pub const DEFAULT_FILL_TIMEOUT: Duration = Duration::from_millis(1000);

/// Configuration for the receive buffer.
#[derive(Debug, Clone, Copy)]
pub struct BufferConfig {
    /// Buffer capacity in bytes; one fill requests at most this many.
    pub capacity: usize,
    /// How long one fill may wait for the driver to produce data.
    pub fill_timeout: Duration,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            fill_timeout: DEFAULT_FILL_TIMEOUT,
        }
    }
}

impl BufferConfig {
    /// Validate configuration parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` or `fill_timeout` is zero.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.capacity == 0 {
            return Err(ClientError::InvalidConfig(
                "capacity must be greater than 0",
            ));
        }
        if self.fill_timeout.is_zero() {
            return Err(ClientError::InvalidConfig(
                "fill_timeout must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Fixed-capacity byte store with a read cursor.
///
/// Invariant: `0 <= pos <= len <= capacity`. `len` is the fill length of the
/// most recent bulk fill, `pos` the read cursor into it.
pub struct RecvBuffer {
    config: BufferConfig,
    buf: Box<[u8]>,
    len: usize,
    pos: usize,
}

impl Default for RecvBuffer {
    fn default() -> Self {
        Self::new(BufferConfig::default()).expect("default config should be valid")
    }
}

impl RecvBuffer {
    /// Create an empty buffer with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: BufferConfig) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self {
            config,
            buf: vec![0u8; config.capacity].into_boxed_slice(),
            len: 0,
            pos: 0,
        })
    }

    /// True iff a byte can be read right now.
    ///
    /// When the buffer is exhausted and the driver reports data pending,
    /// this triggers a fill first; otherwise it is a pure query. Never true
    /// while the buffer is exhausted and nothing is pending.
    pub fn available<D: ModemDriver>(&mut self, driver: &mut D) -> bool {
        if self.is_exhausted() && driver.data_pending() {
            self.fill(driver);
        }
        trace!("buffer at {} of {}", self.pos, self.len);
        self.pos < self.len
    }

    /// Refill the buffer wholesale from the driver.
    ///
    /// Requests up to `capacity` bytes with the configured bounded wait;
    /// sets the fill length to whatever was actually returned (0 on timeout
    /// or error) and resets the cursor. This is the single suspension point
    /// of the read path.
    pub fn fill<D: ModemDriver>(&mut self, driver: &mut D) {
        let n = driver.receive(&mut self.buf, self.config.fill_timeout);
        self.len = n.min(self.config.capacity);
        self.pos = 0;
        debug!("{} bytes read into receive buffer", self.len);
    }

    /// The byte at the cursor, without advancing.
    ///
    /// # Errors
    ///
    /// [`ClientError::BufferEmpty`] when the buffer is exhausted.
    pub fn peek(&self) -> Result<u8, ClientError> {
        if self.pos < self.len {
            Ok(self.buf[self.pos])
        } else {
            Err(ClientError::BufferEmpty)
        }
    }

    /// The byte at the cursor, advancing by one.
    ///
    /// # Errors
    ///
    /// [`ClientError::BufferEmpty`] when the buffer is exhausted.
    pub fn read(&mut self) -> Result<u8, ClientError> {
        if self.pos < self.len {
            let byte = self.buf[self.pos];
            self.pos += 1;
            Ok(byte)
        } else {
            Err(ClientError::BufferEmpty)
        }
    }

    /// True iff the cursor has reached the fill length.
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.len
    }

    /// Unread bytes remaining in the current fill.
    pub fn remaining(&self) -> usize {
        self.len - self.pos
    }

    /// Buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }
}
