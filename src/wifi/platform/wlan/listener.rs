use crate::error::{WifiError, WifiResult};
use crate::wifi::platform::wlan::handle::WlanSession;
use log::debug;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use windows::Win32::{Foundation::ERROR_SUCCESS, NetworkManagement::WiFi::*};

/// How a scan on the watched interface ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanNotification {
    Complete,
    Failed { reason_code: u32 },
}

/// ACM notification subscription that reports scan completion.
///
/// Owns the session it is registered on, so the scan must be started
/// through `session()` for its notifications to arrive here.
#[derive(Debug)]
pub struct ScanListener {
    session: WlanSession,
    context: *mut std::ffi::c_void,
    rx: Receiver<ScanNotification>,
}

unsafe impl Send for ScanListener {}

struct CallbackContext {
    interface: windows::core::GUID,
    tx: Sender<ScanNotification>,
}

impl ScanListener {
    /// Subscribe to scan notifications on a fresh session
    pub fn register() -> WifiResult<Self> {
        let session = WlanSession::open()?;
        let (tx, rx) = mpsc::channel();

        let context = Box::into_raw(Box::new(CallbackContext {
            interface: *session.interface(),
            tx,
        }));

        unsafe {
            let result = WlanRegisterNotification(
                session.as_raw(),
                WLAN_NOTIFICATION_SOURCE_ACM,
                false,
                Some(notification_callback),
                Some(context as *mut std::ffi::c_void),
                None,
                None,
            );

            if result != ERROR_SUCCESS.0 {
                let _ = Box::from_raw(context);
                return Err(WifiError::NotificationRegistrationFailed { code: result });
            }
        }

        Ok(Self {
            session,
            context: context as *mut std::ffi::c_void,
            rx,
        })
    }

    pub fn session(&self) -> &WlanSession {
        &self.session
    }

    /// Wait for the next scan notification. `None` on timeout.
    pub fn wait(&self, timeout: Duration) -> WifiResult<Option<ScanNotification>> {
        match self.rx.recv_timeout(timeout) {
            Ok(notification) => Ok(Some(notification)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(WifiError::Internal("scan listener closed".into()))
            }
        }
    }
}

impl Drop for ScanListener {
    fn drop(&mut self) {
        unsafe {
            // Unregistering blocks until in-flight callbacks have returned
            let _ = WlanRegisterNotification(
                self.session.as_raw(),
                WLAN_NOTIFICATION_SOURCE_NONE,
                true,
                None,
                None,
                None,
                None,
            );
            let _ = Box::from_raw(self.context as *mut CallbackContext);
        }
    }
}

unsafe extern "system" fn notification_callback(
    data: *mut L2_NOTIFICATION_DATA,
    context: *mut std::ffi::c_void,
) {
    if data.is_null() || context.is_null() {
        return;
    }

    // SAFETY: checked for null above; context is the CallbackContext boxed in register
    let (data, ctx) = unsafe { (&*data, &*(context as *const CallbackContext)) };

    if data.NotificationSource != WLAN_NOTIFICATION_SOURCE_ACM
        || data.InterfaceGuid != ctx.interface
    {
        return;
    }

    let notification = if data.NotificationCode == wlan_notification_acm_scan_complete.0 as u32 {
        ScanNotification::Complete
    } else if data.NotificationCode == wlan_notification_acm_scan_fail.0 as u32 {
        let reason_code = if data.dwDataSize as usize >= std::mem::size_of::<u32>()
            && !data.pData.is_null()
        {
            // SAFETY: scan_fail carries a WLAN_REASON_CODE payload
            unsafe { *(data.pData as *const u32) }
        } else {
            0
        };
        ScanNotification::Failed { reason_code }
    } else {
        return;
    };

    debug!("WLAN scan notification: {notification:?}");
    let _ = ctx.tx.send(notification);
}
