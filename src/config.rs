/// Centralized configuration constants for wifiscan
use std::time::Duration;

// Channel
pub const DEFAULT_CHANNEL_NAME: &str = "com.kagri.app/wifi";

// Timing
pub const SCAN_SETTLE_DELAY_MS: u64 = 2000;
pub const FRESH_SCAN_TIMEOUT_SECS: u64 = 10;
pub const PERMISSION_WATCH_TIMEOUT_SECS: u64 = 120;
pub const PERMISSION_POLL_INTERVAL_MS: u64 = 1000;

// Wire method names
pub mod methods {
    pub const SCAN_WIFI: &str = "scanWiFi";
    pub const IS_WIFI_ENABLED: &str = "isWiFiEnabled";
    pub const REQUEST_WIFI_PERMISSION: &str = "requestWiFiPermission";
}

// Wire error codes
pub mod codes {
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const SCAN_ERROR: &str = "SCAN_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// How a scan request treats the OS result cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Trigger a scan and read whatever the OS already holds.
    Cached,
    /// Trigger a scan and wait up to `timeout` for it to finish before reading.
    AwaitFresh { timeout: Duration },
}

impl Default for ScanMode {
    fn default() -> Self {
        ScanMode::Cached
    }
}

/// Runtime settings for the scan service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub scan_mode: ScanMode,
    pub channel_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            scan_mode: ScanMode::default(),
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn with_fresh_scans(mut self, timeout_secs: Option<u64>) -> Self {
        self.scan_mode = ScanMode::AwaitFresh {
            timeout: Duration::from_secs(timeout_secs.unwrap_or(FRESH_SCAN_TIMEOUT_SECS)),
        };
        self
    }

    pub fn with_channel_name(mut self, name: Option<String>) -> Self {
        if let Some(name) = name {
            self.channel_name = name;
        }
        self
    }
}

pub fn scan_settle_delay() -> Duration {
    Duration::from_millis(SCAN_SETTLE_DELAY_MS)
}

pub fn permission_watch_timeout() -> Duration {
    Duration::from_secs(PERMISSION_WATCH_TIMEOUT_SECS)
}

pub fn permission_poll_interval() -> Duration {
    Duration::from_millis(PERMISSION_POLL_INTERVAL_MS)
}
