//! Capability interfaces over the host's permission and radio subsystems
//!
//! The scan service never talks to the OS directly. Each platform provides
//! one implementation of both traits, and tests inject fakes.

use crate::config;
use crate::error::WifiResult;
use crate::wifi::types::{AccessPoint, PermissionOutcome, PermissionState};
use std::time::Duration;

/// Access to the OS permission store for WiFi scanning
pub trait PermissionGate: Send + Sync {
    /// Current permission state. Never cached.
    fn check(&self) -> PermissionState;

    /// Ask the OS to show a permission prompt.
    ///
    /// Returns as soon as the prompt is issued; the user's decision arrives
    /// later through the returned outcome.
    fn prompt(&self) -> WifiResult<PermissionOutcome>;
}

/// Access to the OS radio subsystem
pub trait RadioSubsystem: Send + Sync {
    /// Prepare to observe completion of the next scan.
    ///
    /// Called only when the caller will follow up with `wait_for_scan`.
    fn watch_next_scan(&self) -> WifiResult<()> {
        Ok(())
    }

    /// Ask the radio to refresh its list of visible networks
    fn start_scan(&self) -> WifiResult<()>;

    /// Access points the OS currently holds, possibly from an earlier scan
    fn access_points(&self) -> WifiResult<Vec<AccessPoint>>;

    /// Whether the radio is switched on
    fn is_enabled(&self) -> WifiResult<bool>;

    /// Block until the scan started by `start_scan` completes or `timeout`
    /// elapses. Returns `true` only when completion was observed.
    ///
    /// Backends without completion notifications sleep for the settle delay.
    fn wait_for_scan(&self, timeout: Duration) -> WifiResult<bool> {
        std::thread::sleep(timeout.min(config::scan_settle_delay()));
        Ok(false)
    }
}

impl<T: PermissionGate + ?Sized> PermissionGate for std::sync::Arc<T> {
    fn check(&self) -> PermissionState {
        (**self).check()
    }

    fn prompt(&self) -> WifiResult<PermissionOutcome> {
        (**self).prompt()
    }
}
