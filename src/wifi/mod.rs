//! WiFi scan capability for wifiscan
//!
//! This module owns every interaction with the host radio: permission
//! checks, scan triggering, result normalization and the enabled-state query.

mod backend;
#[cfg(test)]
pub mod fake;
mod normalize;
mod platform;
mod service;
pub mod types;

// Re-export public API
pub use backend::{PermissionGate, RadioSubsystem};
pub use platform::platform_backend;
pub use service::WifiScanService;
pub use types::PermissionOutcome;
