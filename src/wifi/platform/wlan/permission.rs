use crate::error::{WifiError, WifiResult};
use crate::wifi::backend::PermissionGate;
use crate::wifi::platform::spawn_permission_watcher;
use crate::wifi::platform::wlan::handle::WlanSession;
use crate::wifi::platform::wlan::scanning::available_networks;
use crate::wifi::types::{PermissionOutcome, PermissionState};
use log::debug;
use std::process::Command;

const LOCATION_SETTINGS_URI: &str = "ms-settings:privacy-location";

/// Location gate observed through the WLAN API.
///
/// Windows denies the network list with `ERROR_ACCESS_DENIED` when apps
/// are not allowed to use location.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocationGate;

impl PermissionGate for LocationGate {
    fn check(&self) -> PermissionState {
        let probe = WlanSession::open().and_then(|session| available_networks(&session));
        match probe {
            Err(WifiError::AccessDenied) => PermissionState::Denied,
            Err(e) => {
                // Anything else is a radio problem, reported by the scan itself
                debug!("Permission probe inconclusive: {e}");
                PermissionState::Granted
            }
            Ok(_) => PermissionState::Granted,
        }
    }

    fn prompt(&self) -> WifiResult<PermissionOutcome> {
        Command::new("cmd")
            .args(["/C", "start", "", LOCATION_SETTINGS_URI])
            .spawn()
            .map_err(|e| WifiError::PromptUnavailable(e.to_string()))?;

        Ok(spawn_permission_watcher(*self))
    }
}
