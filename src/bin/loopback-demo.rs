//! Host demo: the client facade wired to a loopback driver.
//!
//! The loopback driver plays the role of the modem: every sent byte comes
//! back on the receive side. Useful for exercising the facade end to end
//! without hardware.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin loopback-demo
//! ```

use esp8266_client::{Connectable, EspClient, ModemDriver, Readable, Writable};
use log::{error, info};
use std::collections::VecDeque;
use std::time::Duration;

/// Modem stand-in that echoes sent data back as received data.
struct LoopbackDriver {
    rx: VecDeque<u8>,
}

impl LoopbackDriver {
    fn new() -> Self {
        Self { rx: VecDeque::new() }
    }
}

impl ModemDriver for LoopbackDriver {
    fn open_session(&mut self, _host: &str, _port: u16) -> bool {
        true
    }

    fn close_session(&mut self) -> bool {
        true
    }

    fn send(&mut self, data: &[u8]) -> bool {
        self.rx.extend(data);
        true
    }

    fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> usize {
        let n = self.rx.len().min(buf.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.rx.pop_front().unwrap_or_default();
        }
        n
    }

    fn data_pending(&mut self) -> bool {
        !self.rx.is_empty()
    }

    fn local_ip(&mut self) -> String {
        "127.0.0.1".to_string()
    }

    fn firmware_version(&mut self) -> String {
        "loopback 1.0".to_string()
    }

    fn set_station_mode(&mut self) -> bool {
        true
    }

    fn join_access_point(&mut self, _ssid: &str, _passphrase: &str) -> bool {
        true
    }

    fn disable_multiplexing(&mut self) -> bool {
        true
    }
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("=== Loopback demo starting ===");

    let mut driver = LoopbackDriver::new();
    let mut client = EspClient::new(&mut driver);

    if let Err(e) = client.setup("loopback", "loopback-pass") {
        error!("setup failed: {}", e);
        std::process::exit(1);
    }
    info!("WLAN status: {:?}", client.status());

    if !client.connect_host("localhost", 7) {
        error!("connect failed");
        std::process::exit(1);
    }
    info!("connected, local IP: {:?}", client.local_ip());

    let message = b"hello over the loopback";
    let written = client.write(message);
    info!("wrote {} bytes", written);

    let mut echoed = Vec::new();
    while client.available() {
        match client.read() {
            Ok(byte) => echoed.push(byte),
            Err(e) => {
                error!("read failed: {}", e);
                break;
            }
        }
    }
    info!("read back: {}", String::from_utf8_lossy(&echoed));

    client.stop();
    info!(
        "done: {} setup cycle(s), {} driver error(s)",
        client.setup_count(),
        client.error_count()
    );
}
