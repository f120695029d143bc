//! NetworkManager backend driven through `nmcli`

use crate::error::{WifiError, WifiResult};
use crate::wifi::backend::{PermissionGate, RadioSubsystem};
use crate::wifi::types::{AccessPoint, PermissionOutcome, PermissionState};
use log::{debug, info, warn};
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const SCAN_PERMISSION: &str = "org.freedesktop.NetworkManager.wifi.scan";

fn run_nmcli(args: &[&str]) -> WifiResult<String> {
    let command = format!("nmcli {}", args.join(" "));
    debug!("Running `{command}`");

    let output = Command::new("nmcli")
        .args(args)
        .output()
        .map_err(|source| WifiError::CommandSpawn {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(WifiError::CommandFailed {
            command,
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Split one line of `nmcli -t` output into fields, undoing `\:` and `\\` escapes
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Parse `nmcli -t -f SSID,BSSID,SIGNAL device wifi list` output
fn parse_access_points(output: &str) -> Vec<AccessPoint> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut fields = split_terse(line).into_iter();
            let ssid = fields.next().filter(|s| !s.is_empty());
            let bssid = fields.next().filter(|s| !s.is_empty());
            let signal = fields.next().and_then(|s| s.trim().parse().ok());
            AccessPoint { ssid, bssid, signal }
        })
        .collect()
}

/// Value of the scan permission from `nmcli -t -f PERMISSION,VALUE general permissions`
fn parse_scan_permission(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let fields = split_terse(line);
        match fields.as_slice() {
            [name, value, ..] if name == SCAN_PERMISSION => Some(value.trim().to_string()),
            _ => None,
        }
    })
}

/// Map the scan permission value to a decision.
///
/// `authorized` records an earlier successful interactive rescan.
fn decide(value: Option<&str>, authorized: bool) -> PermissionState {
    match value {
        // Older NetworkManager releases do not gate scans at all
        None | Some("yes") => PermissionState::Granted,
        Some("auth") if authorized => PermissionState::Granted,
        Some(_) => PermissionState::Denied,
    }
}

/// Only an explicit `no` rules out asking polkit
fn prompt_allowed(value: Option<&str>) -> bool {
    value != Some("no")
}

/// Parse `nmcli -t -f WIFI radio` output
fn parse_radio_state(output: &str) -> WifiResult<bool> {
    match output.trim() {
        "enabled" => Ok(true),
        "disabled" => Ok(false),
        other => Err(WifiError::Internal(format!(
            "unexpected radio state `{other}`"
        ))),
    }
}

fn is_scan_throttled(err: &WifiError) -> bool {
    matches!(err, WifiError::CommandFailed { stderr, .. } if stderr.contains("not allowed"))
}

/// Radio controlled by NetworkManager
#[derive(Debug, Default, Clone, Copy)]
pub struct NmcliRadio;

impl NmcliRadio {
    pub fn new() -> Self {
        Self
    }
}

impl RadioSubsystem for NmcliRadio {
    fn start_scan(&self) -> WifiResult<()> {
        match run_nmcli(&["device", "wifi", "rescan"]) {
            Ok(_) => Ok(()),
            // NetworkManager rate-limits rescans; the cached list is still valid
            Err(e) if is_scan_throttled(&e) => {
                warn!("Rescan throttled, using cached results: {e}");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn access_points(&self) -> WifiResult<Vec<AccessPoint>> {
        let output = run_nmcli(&[
            "-t",
            "-f",
            "SSID,BSSID,SIGNAL",
            "device",
            "wifi",
            "list",
            "--rescan",
            "no",
        ])?;
        Ok(parse_access_points(&output))
    }

    fn is_enabled(&self) -> WifiResult<bool> {
        let output = run_nmcli(&["-t", "-f", "WIFI", "radio"])?;
        parse_radio_state(&output)
    }
}

/// NetworkManager's polkit permission for WiFi scans.
///
/// `auth` means polkit will ask the user. A successful interactive rescan is
/// remembered for the lifetime of the gate.
#[derive(Debug, Default, Clone)]
pub struct NmcliGate {
    authorized: Arc<AtomicBool>,
}

impl NmcliGate {
    fn scan_permission(&self) -> Option<String> {
        match run_nmcli(&["-t", "-f", "PERMISSION,VALUE", "general", "permissions"]) {
            Ok(output) => parse_scan_permission(&output),
            Err(e) => {
                debug!("Permission query failed: {e}");
                None
            }
        }
    }
}

impl PermissionGate for NmcliGate {
    fn check(&self) -> PermissionState {
        decide(
            self.scan_permission().as_deref(),
            self.authorized.load(Ordering::SeqCst),
        )
    }

    fn prompt(&self) -> WifiResult<PermissionOutcome> {
        if !prompt_allowed(self.scan_permission().as_deref()) {
            return Err(WifiError::PromptUnavailable(
                "NetworkManager does not allow WiFi scans for this user".into(),
            ));
        }

        let (tx, outcome) = PermissionOutcome::channel();
        let authorized = Arc::clone(&self.authorized);

        std::thread::spawn(move || {
            // The session's polkit agent shows the prompt while this runs
            let decision = match run_nmcli(&["device", "wifi", "rescan"]) {
                Ok(_) => PermissionState::Granted,
                Err(e) if is_scan_throttled(&e) => PermissionState::Granted,
                Err(e) => {
                    debug!("Interactive rescan failed: {e}");
                    PermissionState::Denied
                }
            };
            if decision.is_granted() {
                authorized.store(true, Ordering::SeqCst);
            }
            info!("Permission prompt resolved: {decision:?}");
            let _ = tx.send(decision);
        });

        Ok(outcome)
    }
}
