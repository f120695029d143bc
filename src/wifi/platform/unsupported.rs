use crate::error::{WifiError, WifiResult};
use crate::wifi::backend::{PermissionGate, RadioSubsystem};
use crate::wifi::types::{AccessPoint, PermissionOutcome, PermissionState};

#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedRadio;

impl UnsupportedRadio {
    pub fn new() -> Self {
        Self
    }
}

impl RadioSubsystem for UnsupportedRadio {
    fn start_scan(&self) -> WifiResult<()> {
        Err(WifiError::Unsupported)
    }

    fn access_points(&self) -> WifiResult<Vec<AccessPoint>> {
        Err(WifiError::Unsupported)
    }

    fn is_enabled(&self) -> WifiResult<bool> {
        Err(WifiError::Unsupported)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedGate;

impl PermissionGate for UnsupportedGate {
    fn check(&self) -> PermissionState {
        PermissionState::Denied
    }

    fn prompt(&self) -> WifiResult<PermissionOutcome> {
        Err(WifiError::Unsupported)
    }
}
