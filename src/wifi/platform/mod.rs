//! Host backends for the scan service
//!
//! Exactly one backend is compiled in for the build target; see
//! [`platform_backend`].

#[cfg(target_os = "linux")]
mod nmcli;
#[cfg(not(any(windows, target_os = "linux")))]
mod unsupported;
#[cfg(windows)]
mod wlan;

use crate::config;
use crate::wifi::backend::PermissionGate;
use crate::wifi::types::{PermissionOutcome, PermissionState};
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

#[cfg(target_os = "linux")]
pub use nmcli::{NmcliGate as PlatformGate, NmcliRadio as PlatformRadio};
#[cfg(not(any(windows, target_os = "linux")))]
pub use unsupported::{UnsupportedGate as PlatformGate, UnsupportedRadio as PlatformRadio};
#[cfg(windows)]
pub use wlan::{LocationGate as PlatformGate, WlanRadio as PlatformRadio};

/// Radio and permission backends for the current target
pub fn platform_backend() -> (Arc<PlatformRadio>, Arc<PlatformGate>) {
    (Arc::new(PlatformRadio::new()), Arc::new(PlatformGate::default()))
}

/// Poll `gate` on a background thread until permission is granted or the
/// watch timeout passes, then resolve the returned outcome.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn spawn_permission_watcher<G>(gate: G) -> PermissionOutcome
where
    G: PermissionGate + 'static,
{
    let (tx, outcome) = PermissionOutcome::channel();

    std::thread::spawn(move || {
        let deadline = Instant::now() + config::permission_watch_timeout();
        let decision = loop {
            if gate.check().is_granted() {
                break PermissionState::Granted;
            }
            if tx.is_closed() || Instant::now() >= deadline {
                break PermissionState::Denied;
            }
            std::thread::sleep(config::permission_poll_interval());
        };

        info!("Permission prompt resolved: {decision:?}");
        if tx.send(decision).is_err() {
            debug!("Permission outcome dropped by caller");
        }
    });

    outcome
}
