use serde::Serialize;
use tokio::sync::oneshot;

/// Live OS permission state for WiFi scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_granted(self) -> bool {
        self == PermissionState::Granted
    }
}

/// Radio enabled-state, read fresh on every query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioState {
    Enabled,
    Disabled,
}

impl RadioState {
    pub fn is_enabled(self) -> bool {
        self == RadioState::Enabled
    }
}

impl From<bool> for RadioState {
    fn from(enabled: bool) -> Self {
        if enabled {
            RadioState::Enabled
        } else {
            RadioState::Disabled
        }
    }
}

/// SSID of a discovered network
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NetworkName(String);

impl NetworkName {
    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Normalized scan output: non-empty, unique and sorted ascending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScanResult(Vec<NetworkName>);

impl ScanResult {
    /// Callers must uphold the ordering invariant; see `normalize`.
    pub(super) fn from_sorted(names: impl IntoIterator<Item = String>) -> Self {
        Self(names.into_iter().map(NetworkName).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(NetworkName::as_str).collect()
    }
}

/// Raw access point record as reported by a backend
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AccessPoint {
    pub ssid: Option<String>,
    pub bssid: Option<String>,
    pub signal: Option<u8>,
}

impl AccessPoint {
    #[cfg(test)]
    pub fn named(ssid: impl Into<String>) -> Self {
        Self {
            ssid: Some(ssid.into()),
            ..Self::default()
        }
    }
}

/// Eventual answer to an OS permission prompt
#[derive(Debug)]
pub struct PermissionOutcome {
    rx: oneshot::Receiver<PermissionState>,
}

impl PermissionOutcome {
    /// Create an outcome and the sender a backend resolves it with
    pub fn channel() -> (oneshot::Sender<PermissionState>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// Wait for the user's decision.
    ///
    /// A backend that gives up without answering is reported as `Denied`.
    pub async fn wait(self) -> PermissionState {
        self.rx.await.unwrap_or(PermissionState::Denied)
    }
}

/// Result of a permission request
///
/// `granted` is a snapshot taken at call time. When a prompt was issued,
/// `outcome` resolves once the user answers it; dropping it discards the answer.
#[derive(Debug)]
pub struct PermissionRequest {
    pub granted: bool,
    pub outcome: Option<PermissionOutcome>,
}
