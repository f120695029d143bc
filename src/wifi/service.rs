use crate::config::{ScanMode, ServiceConfig};
use crate::error::ServiceError;
use crate::wifi::backend::{PermissionGate, RadioSubsystem};
use crate::wifi::normalize::normalize;
use crate::wifi::types::{PermissionRequest, RadioState, ScanResult};
use log::{debug, info, warn};
use std::sync::Arc;

/// Permission-gated WiFi scan capability
///
/// Holds no state of its own. Permission and radio state are read from the
/// backends on every call.
pub struct WifiScanService<R, P> {
    radio: Arc<R>,
    permissions: Arc<P>,
    config: ServiceConfig,
}

impl<R, P> Clone for WifiScanService<R, P> {
    fn clone(&self) -> Self {
        Self {
            radio: Arc::clone(&self.radio),
            permissions: Arc::clone(&self.permissions),
            config: self.config.clone(),
        }
    }
}

impl<R, P> WifiScanService<R, P>
where
    R: RadioSubsystem,
    P: PermissionGate,
{
    pub fn new(radio: Arc<R>, permissions: Arc<P>, config: ServiceConfig) -> Self {
        Self {
            radio,
            permissions,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Trigger a scan and return the normalized list of visible SSIDs
    pub fn request_scan(&self) -> Result<ScanResult, ServiceError> {
        if !self.permissions.check().is_granted() {
            info!("Scan refused: permission not granted");
            return Err(ServiceError::PermissionDenied);
        }

        if matches!(self.config.scan_mode, ScanMode::AwaitFresh { .. }) {
            self.radio.watch_next_scan()?;
        }
        self.radio.start_scan()?;

        if let ScanMode::AwaitFresh { timeout } = self.config.scan_mode {
            if !self.radio.wait_for_scan(timeout)? {
                warn!("Scan did not report completion within {timeout:?}, reading cached results");
            }
        }

        let records = self.radio.access_points()?;
        let raw_count = records.len();
        let result = normalize(records);
        debug!(
            "Scan returned {raw_count} access points, {} unique networks",
            result.len()
        );
        Ok(result)
    }

    /// Radio state, with any failure reported as `Disabled`
    pub fn query_radio_enabled(&self) -> RadioState {
        match self.radio.is_enabled() {
            Ok(enabled) => RadioState::from(enabled),
            Err(e) => {
                debug!("Radio state unavailable, reporting disabled: {e}");
                RadioState::Disabled
            }
        }
    }

    /// Report whether permission is held now, prompting the user if not
    pub fn request_permission(&self) -> PermissionRequest {
        if self.permissions.check().is_granted() {
            return PermissionRequest {
                granted: true,
                outcome: None,
            };
        }

        let outcome = match self.permissions.prompt() {
            Ok(outcome) => {
                info!("Permission prompt issued");
                Some(outcome)
            }
            Err(e) => {
                warn!("Could not issue permission prompt: {e}");
                None
            }
        };

        PermissionRequest {
            granted: false,
            outcome,
        }
    }
}
