//! WLAN association.
//!
//! Before any TCP traffic, the modem must be driven through a fixed setup
//! cycle: select station mode, join the access point, disable connection
//! multiplexing. All three must succeed in one cycle for the WLAN to count
//! as associated. Failed cycles are retried under a bounded policy with
//! exponential backoff; the retry budget is surfaced to the caller instead
//! of blocking forever.

use crate::connection::ErrorCounter;
use crate::driver::ModemDriver;
use crate::error::ClientError;
use log::{debug, info, warn};
use std::fmt;
use std::thread;
use std::time::Duration;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Default maximum number of association cycles per `setup` call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// Default backoff before the first retry.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(250);

/// Default backoff ceiling.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(8);

/// State of the WLAN link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WlanState {
    /// Not associated, or a cycle failed.
    #[default]
    Unknown,
    /// Associated with the access point.
    Connected,
}

/// Access point credentials, stored once at setup and reused on every
/// association retry. The passphrase is wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    ssid: String,
    passphrase: String,
}

impl Credentials {
    /// Store credentials for an access point.
    pub fn new(ssid: impl Into<String>, passphrase: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            passphrase: passphrase.into(),
        }
    }

    /// Network SSID.
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Network passphrase.
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid)
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// Retry policy for the association loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of cycles before giving up.
    pub max_attempts: u32,
    /// Backoff before the first retry; doubles per retry.
    pub initial_backoff: Duration,
    /// Backoff ceiling.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Validate policy parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_attempts` is 0 or the initial backoff
    /// exceeds the ceiling.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.max_attempts == 0 {
            return Err(ClientError::InvalidConfig(
                "max_attempts must be greater than 0",
            ));
        }
        if self.initial_backoff > self.max_backoff {
            return Err(ClientError::InvalidConfig(
                "initial_backoff must not exceed max_backoff",
            ));
        }
        Ok(())
    }
}

/// WLAN association loop.
///
/// Tracks the WLAN state and the number of cycles attempted. One cycle
/// queries the firmware version (diagnostic only), then runs the three
/// mandatory steps. A cycle does not short-circuit: later steps still run
/// after an earlier one failed, so every failure gets logged in one pass.
#[derive(Debug)]
pub struct Association {
    state: WlanState,
    setup_count: u32,
    policy: RetryPolicy,
}

impl Default for Association {
    fn default() -> Self {
        Self::new(RetryPolicy::default()).expect("default policy should be valid")
    }
}

impl Association {
    /// Create an association loop with the given retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy is invalid.
    pub fn new(policy: RetryPolicy) -> Result<Self, ClientError> {
        policy.validate()?;
        Ok(Self {
            state: WlanState::Unknown,
            setup_count: 0,
            policy,
        })
    }

    /// Current WLAN state.
    pub fn state(&self) -> WlanState {
        self.state
    }

    /// Number of association cycles attempted so far. Purely informative.
    pub fn setup_count(&self) -> u32 {
        self.setup_count
    }

    /// Run one association cycle. Returns true iff all mandatory steps
    /// succeeded.
    ///
    /// On success the state becomes `Connected` and `errors` resets to 0;
    /// on failure the state stays `Unknown` and `errors` is incremented by
    /// exactly one. The cycle counter advances either way.
    pub fn attempt<D: ModemDriver>(
        &mut self,
        driver: &mut D,
        credentials: &Credentials,
        errors: &mut ErrorCounter,
    ) -> bool {
        let firmware = driver.firmware_version();
        debug!("modem firmware: {}", firmware);

        let mut associated = true;

        if driver.set_station_mode() {
            debug!("station mode selected");
        } else {
            warn!("station mode selection failed");
            associated = false;
        }

        if driver.join_access_point(credentials.ssid(), credentials.passphrase()) {
            info!(
                "joined {}, IP: {}",
                credentials.ssid(),
                driver.local_ip()
            );
        } else {
            warn!("failed to join {}", credentials.ssid());
            associated = false;
        }

        if driver.disable_multiplexing() {
            debug!("multiplexing disabled");
        } else {
            warn!("failed to disable multiplexing");
            associated = false;
        }

        self.setup_count = self.setup_count.saturating_add(1);

        if associated {
            self.state = WlanState::Connected;
            errors.reset();
        } else {
            self.state = WlanState::Unknown;
            errors.increment();
        }

        associated
    }

    /// Run association cycles under the retry policy until the WLAN is
    /// associated, blocking the caller for the backoff sleeps in between.
    ///
    /// Returns immediately when already associated; re-association only
    /// happens after the state has been lost, not on every call.
    ///
    /// # Errors
    ///
    /// [`ClientError::AssociationFailed`] once the retry budget is
    /// exhausted.
    pub fn run<D: ModemDriver>(
        &mut self,
        driver: &mut D,
        credentials: &Credentials,
        errors: &mut ErrorCounter,
    ) -> Result<(), ClientError> {
        if self.state == WlanState::Connected {
            debug!("WLAN already associated");
            return Ok(());
        }

        let mut backoff = self.policy.initial_backoff;
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            if self.attempt(driver, credentials, errors) {
                info!("WLAN associated after {} attempt(s)", attempt);
                return Ok(());
            }

            if attempt < max_attempts {
                debug!(
                    "association attempt {} of {} failed, retrying in {:?}",
                    attempt, max_attempts, backoff
                );
                thread::sleep(backoff);
                backoff = (backoff * 2).min(self.policy.max_backoff);
            }
        }

        warn!("association retry budget exhausted");
        Err(ClientError::AssociationFailed {
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MockModem;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    #[test]
    fn test_invalid_policy_zero_attempts() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert!(matches!(
            Association::new(policy),
            Err(ClientError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_policy_backoff_order() {
        let policy = RetryPolicy {
            initial_backoff: Duration::from_secs(10),
            max_backoff: Duration::from_secs(1),
            ..RetryPolicy::default()
        };
        assert!(matches!(
            Association::new(policy),
            Err(ClientError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_successful_cycle_resets_error_counter() {
        let mut modem = MockModem::new();
        let mut assoc = Association::default();
        let mut errors = ErrorCounter::default();
        errors.increment();
        errors.increment();

        let credentials = Credentials::new("lab", "hunter22");
        assert!(assoc.attempt(&mut modem, &credentials, &mut errors));
        assert_eq!(assoc.state(), WlanState::Connected);
        assert_eq!(errors.count(), 0);
        assert_eq!(assoc.setup_count(), 1);
        assert_eq!(
            modem.last_join,
            Some(("lab".to_string(), "hunter22".to_string()))
        );
    }

    #[test]
    fn test_failed_join_increments_counter_once() {
        let mut modem = MockModem::new();
        modem.join_ok = false;
        let mut assoc = Association::default();
        let mut errors = ErrorCounter::default();

        let credentials = Credentials::new("lab", "hunter22");
        assert!(!assoc.attempt(&mut modem, &credentials, &mut errors));
        assert_eq!(assoc.state(), WlanState::Unknown);
        assert_eq!(errors.count(), 1);
        assert_eq!(assoc.setup_count(), 1);
    }

    #[test]
    fn test_cycle_does_not_short_circuit() {
        // Station-mode failure must not skip the join and MUX steps
        let mut modem = MockModem::new();
        modem.station_ok = false;

        let mut assoc = Association::default();
        let mut errors = ErrorCounter::default();
        let credentials = Credentials::new("lab", "hunter22");

        assert!(!assoc.attempt(&mut modem, &credentials, &mut errors));
        assert_eq!(modem.station_calls, 1);
        assert_eq!(modem.join_calls, 1);
        assert_eq!(modem.mux_calls, 1);
        // One failed cycle is one counter increment, not one per step
        assert_eq!(errors.count(), 1);
    }

    #[test]
    fn test_version_query_is_diagnostic_only() {
        let mut modem = MockModem::new();
        let mut assoc = Association::default();
        let mut errors = ErrorCounter::default();
        let credentials = Credentials::new("lab", "hunter22");

        assert!(assoc.attempt(&mut modem, &credentials, &mut errors));
        assert_eq!(modem.version_calls, 1);
    }

    #[test]
    fn test_run_retries_until_success() {
        let mut modem = MockModem::new();
        modem.join_results.extend([false, false, true]);

        let mut assoc = Association::new(fast_policy(5)).unwrap();
        let mut errors = ErrorCounter::default();
        let credentials = Credentials::new("lab", "hunter22");

        assert!(assoc.run(&mut modem, &credentials, &mut errors).is_ok());
        assert_eq!(assoc.state(), WlanState::Connected);
        assert_eq!(assoc.setup_count(), 3);
        // Reset happens on the clean cycle, wiping the two failures
        assert_eq!(errors.count(), 0);
    }

    #[test]
    fn test_run_exhausts_retry_budget() {
        let mut modem = MockModem::new();
        modem.join_ok = false;

        let mut assoc = Association::new(fast_policy(3)).unwrap();
        let mut errors = ErrorCounter::default();
        let credentials = Credentials::new("lab", "hunter22");

        let result = assoc.run(&mut modem, &credentials, &mut errors);
        assert_eq!(result, Err(ClientError::AssociationFailed { attempts: 3 }));
        assert_eq!(assoc.state(), WlanState::Unknown);
        assert_eq!(assoc.setup_count(), 3);
        assert_eq!(errors.count(), 3);
    }

    #[test]
    fn test_run_is_noop_when_already_associated() {
        let mut modem = MockModem::new();
        let mut assoc = Association::new(fast_policy(3)).unwrap();
        let mut errors = ErrorCounter::default();
        let credentials = Credentials::new("lab", "hunter22");

        assoc.run(&mut modem, &credentials, &mut errors).unwrap();
        let cycles = assoc.setup_count();

        assoc.run(&mut modem, &credentials, &mut errors).unwrap();
        assert_eq!(assoc.setup_count(), cycles);
        assert_eq!(modem.join_calls, 1);
    }

    #[test]
    fn test_credentials_debug_redacts_passphrase() {
        let credentials = Credentials::new("lab", "hunter22");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("lab"));
        assert!(!debug.contains("hunter22"));
    }
}
