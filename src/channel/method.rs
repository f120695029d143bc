use crate::config::methods;

/// Calls accepted on the WiFi channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    ScanWifi,
    IsWifiEnabled,
    RequestWifiPermission,
    Unrecognized(String),
}

impl Method {
    /// Decode a wire method name. Unknown names are kept for the reply log.
    pub fn from_name(name: &str) -> Self {
        match name {
            methods::SCAN_WIFI => Method::ScanWifi,
            methods::IS_WIFI_ENABLED => Method::IsWifiEnabled,
            methods::REQUEST_WIFI_PERMISSION => Method::RequestWifiPermission,
            other => Method::Unrecognized(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Method::ScanWifi => methods::SCAN_WIFI,
            Method::IsWifiEnabled => methods::IS_WIFI_ENABLED,
            Method::RequestWifiPermission => methods::REQUEST_WIFI_PERMISSION,
            Method::Unrecognized(name) => name,
        }
    }
}
