use crate::error::{WifiError, WifiResult};
use crate::wifi::backend::RadioSubsystem;
use crate::wifi::platform::wlan::handle::WlanSession;
use crate::wifi::platform::wlan::listener::{ScanListener, ScanNotification};
use crate::wifi::types::AccessPoint;
use log::{debug, warn};
use std::sync::Mutex;
use std::time::Duration;
use windows::Win32::{
    Foundation::{ERROR_ACCESS_DENIED, ERROR_SUCCESS},
    NetworkManagement::WiFi::*,
};

/// Radio backed by the native WLAN API
#[derive(Debug, Default)]
pub struct WlanRadio {
    // Registered by watch_next_scan, consumed by wait_for_scan
    pending: Mutex<Option<ScanListener>>,
}

impl WlanRadio {
    pub fn new() -> Self {
        Self::default()
    }

    fn trigger(session: &WlanSession) -> WifiResult<()> {
        unsafe {
            let result = WlanScan(session.as_raw(), session.interface(), None, None, None);
            if result != ERROR_SUCCESS.0 {
                return Err(WifiError::ScanFailed { code: result });
            }
        }
        Ok(())
    }
}

impl RadioSubsystem for WlanRadio {
    fn watch_next_scan(&self) -> WifiResult<()> {
        match ScanListener::register() {
            Ok(listener) => {
                if let Ok(mut pending) = self.pending.lock() {
                    *pending = Some(listener);
                }
            }
            Err(e) => debug!("Scan notifications unavailable ({e}), scanning without them"),
        }
        Ok(())
    }

    fn start_scan(&self) -> WifiResult<()> {
        let Ok(mut pending) = self.pending.lock() else {
            return Self::trigger(&WlanSession::open()?);
        };

        let result = match pending.as_ref() {
            Some(listener) => Self::trigger(listener.session()),
            None => Self::trigger(&WlanSession::open()?),
        };
        if result.is_err() {
            // Drop the listener of a scan that never started
            pending.take();
        }
        result
    }

    fn access_points(&self) -> WifiResult<Vec<AccessPoint>> {
        let session = WlanSession::open()?;
        available_networks(&session)
    }

    fn is_enabled(&self) -> WifiResult<bool> {
        let session = WlanSession::open()?;

        unsafe {
            let mut data_size = 0;
            let mut data_ptr: *mut std::ffi::c_void = std::ptr::null_mut();
            let mut opcode_value_type = wlan_opcode_value_type_invalid;

            let result = WlanQueryInterface(
                session.as_raw(),
                session.interface(),
                wlan_intf_opcode_radio_state,
                None,
                &mut data_size,
                &mut data_ptr,
                Some(&mut opcode_value_type),
            );
            if result != ERROR_SUCCESS.0 {
                return Err(WifiError::RadioQueryFailed { code: result });
            }

            let radio_state = &*(data_ptr as *const WLAN_RADIO_STATE);
            let count = (radio_state.dwNumberOfPhys as usize).min(radio_state.PhyRadioState.len());
            let phys = &radio_state.PhyRadioState[..count];
            let enabled = phys.iter().any(|phy| {
                phy.dot11SoftwareRadioState == dot11_radio_state_on
                    && phy.dot11HardwareRadioState == dot11_radio_state_on
            });
            WlanFreeMemory(data_ptr);
            Ok(enabled)
        }
    }

    fn wait_for_scan(&self, timeout: Duration) -> WifiResult<bool> {
        let listener = self.pending.lock().ok().and_then(|mut pending| pending.take());
        let Some(listener) = listener else {
            std::thread::sleep(timeout.min(crate::config::scan_settle_delay()));
            return Ok(false);
        };

        match listener.wait(timeout)? {
            Some(ScanNotification::Complete) => Ok(true),
            Some(ScanNotification::Failed { reason_code }) => {
                warn!("WLAN scan failed (reason: {reason_code}), results may be stale");
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

/// Read the OS network list for the session's interface
pub(super) fn available_networks(session: &WlanSession) -> WifiResult<Vec<AccessPoint>> {
    unsafe {
        let mut network_list: *mut WLAN_AVAILABLE_NETWORK_LIST = std::ptr::null_mut();
        let result = WlanGetAvailableNetworkList(
            session.as_raw(),
            session.interface(),
            WLAN_AVAILABLE_NETWORK_INCLUDE_ALL_MANUAL_HIDDEN_PROFILES,
            None,
            &mut network_list,
        );

        if result == ERROR_ACCESS_DENIED.0 {
            return Err(WifiError::AccessDenied);
        }
        if result != ERROR_SUCCESS.0 {
            return Err(WifiError::NetworkListFailed { code: result });
        }

        let items = std::slice::from_raw_parts(
            (*network_list).Network.as_ptr(),
            (*network_list).dwNumberOfItems as usize,
        );

        let access_points = items
            .iter()
            .map(|item| {
                let ssid_len = (item.dot11Ssid.uSSIDLength as usize).min(item.dot11Ssid.ucSSID.len());
                let ssid = (ssid_len > 0).then(|| {
                    String::from_utf8_lossy(&item.dot11Ssid.ucSSID[..ssid_len]).to_string()
                });
                AccessPoint {
                    ssid,
                    bssid: None,
                    signal: Some(item.wlanSignalQuality as u8),
                }
            })
            .collect();

        WlanFreeMemory(network_list as *mut _);
        Ok(access_points)
    }
}
