use crate::channel::method::Method;
use crate::config::codes;
use crate::error::ServiceError;
use crate::wifi::{PermissionGate, PermissionOutcome, RadioSubsystem, WifiScanService};
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Value, json};

/// Answer to a single channel call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Reply {
    Success { result: Value },
    Error { code: String, message: String },
    NotImplemented,
}

impl Reply {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Reply::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success { .. })
    }
}

impl From<ServiceError> for Reply {
    fn from(err: ServiceError) -> Self {
        Reply::error(err.code(), err.to_string())
    }
}

/// Unsolicited message sent after a call has already been answered
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Event {
    PermissionResult { granted: bool },
}

/// Run one call against the service.
///
/// Never fails: every error is folded into the reply. A permission prompt
/// that is still open is handed back so the caller can forward its answer.
pub fn dispatch<R, P>(
    service: &WifiScanService<R, P>,
    method: &Method,
) -> (Reply, Option<PermissionOutcome>)
where
    R: RadioSubsystem,
    P: PermissionGate,
{
    debug!("Dispatching `{}`", method.name());

    match method {
        Method::ScanWifi => {
            let reply = match service.request_scan() {
                Ok(networks) => Reply::Success {
                    result: json!(networks),
                },
                Err(e) => {
                    warn!("{}: {e}", e.code());
                    Reply::from(e)
                }
            };
            (reply, None)
        }
        Method::IsWifiEnabled => {
            let enabled = service.query_radio_enabled().is_enabled();
            (Reply::Success { result: json!(enabled) }, None)
        }
        Method::RequestWifiPermission => {
            let request = service.request_permission();
            (
                Reply::Success {
                    result: json!(request.granted),
                },
                request.outcome,
            )
        }
        Method::Unrecognized(name) => {
            debug!("No handler for `{name}`");
            (Reply::NotImplemented, None)
        }
    }
}

/// Reply used when a call could not be decoded
pub fn bad_request(message: impl Into<String>) -> Reply {
    Reply::error(codes::BAD_REQUEST, message)
}
