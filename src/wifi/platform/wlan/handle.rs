use crate::error::{WifiError, WifiResult, win32_error_to_string};
use log::debug;
use windows::{
    Win32::{
        Foundation::{ERROR_SUCCESS, HANDLE},
        NetworkManagement::WiFi::*,
    },
    core::GUID,
};

/// WLAN client session bound to the first wireless interface.
///
/// The handle is closed on drop.
#[derive(Debug)]
pub struct WlanSession {
    handle: HANDLE,
    interface: GUID,
}

impl WlanSession {
    /// Open a client handle and pick the first WLAN interface
    pub fn open() -> WifiResult<Self> {
        let mut negotiated_version = 0;
        let mut handle = HANDLE::default();
        unsafe {
            let result = WlanOpenHandle(2, None, &mut negotiated_version, &mut handle);
            if result != ERROR_SUCCESS.0 {
                debug!("WlanOpenHandle: {}", win32_error_to_string(result));
                return Err(WifiError::HandleOpenFailed { code: result });
            }
        }

        // Dropping the session on error closes the handle
        let mut session = Self {
            handle,
            interface: GUID::zeroed(),
        };
        session.interface = session.first_interface()?;
        Ok(session)
    }

    pub fn as_raw(&self) -> HANDLE {
        self.handle
    }

    pub fn interface(&self) -> &GUID {
        &self.interface
    }

    fn first_interface(&self) -> WifiResult<GUID> {
        unsafe {
            let mut interface_list: *mut WLAN_INTERFACE_INFO_LIST = std::ptr::null_mut();
            let result = WlanEnumInterfaces(self.handle, None, &mut interface_list);
            if result != ERROR_SUCCESS.0 {
                return Err(WifiError::InterfaceEnumFailed { code: result });
            }

            if (*interface_list).dwNumberOfItems == 0 {
                WlanFreeMemory(interface_list as *mut _);
                return Err(WifiError::NoInterface);
            }

            let guid = (*interface_list).InterfaceInfo[0].InterfaceGuid;
            WlanFreeMemory(interface_list as *mut _);
            Ok(guid)
        }
    }
}

impl Drop for WlanSession {
    fn drop(&mut self) {
        unsafe {
            let _ = WlanCloseHandle(self.handle, None);
        }
    }
}

unsafe impl Send for WlanSession {}
