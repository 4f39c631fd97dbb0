//! Stream-style client facade for ESP8266 AT-command WiFi modems.
//!
//! The modem is reachable only through a narrow command/response driver
//! ([`ModemDriver`], injected at construction). This crate layers a
//! single-connection stream abstraction on top of it and hides three
//! problems underneath:
//!
//! - the TCP session state machine ([`connection`]),
//! - a fixed-capacity receive buffer refilled in bulk from a
//!   timeout-bounded driver call ([`buffer`]),
//! - the WLAN association retry loop that must fully succeed before any
//!   TCP operation ([`wlan`]).
//!
//! # Example
//!
//! ```ignore
//! use esp8266_client::{Connectable, EspClient, Readable, Writable};
//!
//! let mut client = EspClient::new(&mut driver);
//! client.setup("MyNetwork", "MyPassword")?;
//!
//! if client.connect_host("example.com", 80) {
//!     client.write(b"GET / HTTP/1.0\r\n\r\n");
//!     while client.available() {
//!         let byte = client.read()?;
//!         // ...
//!     }
//!     client.stop();
//! }
//! ```
//!
//! Everything is synchronous and single-threaded; no operation may be
//! invoked concurrently from multiple threads.

pub mod buffer;
pub mod client;
pub mod connection;
pub mod driver;
pub mod error;
pub mod wlan;

// Re-export commonly used items
pub use buffer::{BufferConfig, RecvBuffer, DEFAULT_CAPACITY, DEFAULT_FILL_TIMEOUT};
pub use client::{Connectable, EspClient, Readable, Writable};
pub use connection::{Connection, ConnectionState, ErrorCounter};
pub use driver::ModemDriver;
pub use error::ClientError;
pub use wlan::{Association, Credentials, RetryPolicy, WlanState};
