/// Typed errors for wifiscan
use thiserror::Error;

use crate::config;

/// Result type alias for backend WiFi operations
pub type WifiResult<T> = Result<T, WifiError>;

/// Errors raised by a radio or permission backend
#[derive(Error, Debug)]
pub enum WifiError {
    #[error("Failed to open WLAN handle (code: {code})")]
    HandleOpenFailed { code: u32 },

    #[error("Failed to enumerate interfaces (code: {code})")]
    InterfaceEnumFailed { code: u32 },

    #[error("No WiFi interface found")]
    NoInterface,

    #[error("Failed to get available networks (code: {code})")]
    NetworkListFailed { code: u32 },

    #[error("Failed to query radio state (code: {code})")]
    RadioQueryFailed { code: u32 },

    #[error("Failed to register notification (code: {code})")]
    NotificationRegistrationFailed { code: u32 },

    #[error("Failed to scan networks (code: {code})")]
    ScanFailed { code: u32 },

    #[error("Location access is denied for WiFi scanning")]
    AccessDenied,

    #[error("Permission cannot be requested: {0}")]
    PromptUnavailable(String),

    #[error("`{command}` exited with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("Failed to run `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("WiFi scanning is not supported on this platform")]
    Unsupported,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures reported across the method channel
///
/// These are returned to the caller, never raised past the boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("WiFi scan permission not granted")]
    PermissionDenied,

    #[error("WiFi scan failed: {0}")]
    ScanFailure(String),
}

impl ServiceError {
    /// Wire error code
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::PermissionDenied => config::codes::PERMISSION_DENIED,
            ServiceError::ScanFailure(_) => config::codes::SCAN_ERROR,
        }
    }
}

impl From<WifiError> for ServiceError {
    fn from(err: WifiError) -> Self {
        ServiceError::ScanFailure(err.to_string())
    }
}

/// Convert a Win32 error code returned by the WLAN API to a human-readable string
#[cfg_attr(not(windows), allow(dead_code))]
pub fn win32_error_to_string(code: u32) -> String {
    match code {
        0 => "Success".to_string(),
        5 => "Access Denied".to_string(),
        6 => "Invalid Handle".to_string(),
        8 => "Not Enough Memory".to_string(),
        50 => "Not Supported".to_string(),
        87 => "Invalid Parameter".to_string(),
        1062 => "Service Not Active".to_string(),
        1168 => "Not Found".to_string(),
        1247 => "Already Initialized".to_string(),
        1399 => "Invalid State".to_string(),
        2150899714 => "Remote Session Not Allowed".to_string(),
        _ => format!("Unknown Error (Code: {code}, 0x{code:X})"),
    }
}
