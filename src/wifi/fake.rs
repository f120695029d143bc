//! In-memory backend used by unit tests

use crate::error::{WifiError, WifiResult};
use crate::wifi::backend::{PermissionGate, RadioSubsystem};
use crate::wifi::types::{AccessPoint, PermissionOutcome, PermissionState};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug, Default)]
pub struct FakeRadio {
    pub networks: Mutex<Vec<AccessPoint>>,
    pub enabled: AtomicBool,
    pub fail_scan: AtomicBool,
    pub fail_list: AtomicBool,
    pub fail_enabled: AtomicBool,
    pub scan_completes: AtomicBool,
    pub scans: AtomicUsize,
    pub watches: AtomicUsize,
    pub waits: AtomicUsize,
}

impl FakeRadio {
    pub fn with_ssids(ssids: &[&str]) -> Self {
        let radio = Self::default();
        radio.enabled.store(true, Ordering::SeqCst);
        *radio.networks.lock().unwrap() = ssids.iter().map(|s| AccessPoint::named(*s)).collect();
        radio
    }

    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

impl RadioSubsystem for FakeRadio {
    fn watch_next_scan(&self) -> WifiResult<()> {
        self.watches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn start_scan(&self) -> WifiResult<()> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        if self.fail_scan.load(Ordering::SeqCst) {
            return Err(WifiError::ScanFailed { code: 1062 });
        }
        Ok(())
    }

    fn access_points(&self) -> WifiResult<Vec<AccessPoint>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(WifiError::NetworkListFailed { code: 87 });
        }
        Ok(self.networks.lock().unwrap().clone())
    }

    fn is_enabled(&self) -> WifiResult<bool> {
        if self.fail_enabled.load(Ordering::SeqCst) {
            return Err(WifiError::NoInterface);
        }
        Ok(self.enabled.load(Ordering::SeqCst))
    }

    fn wait_for_scan(&self, _timeout: Duration) -> WifiResult<bool> {
        self.waits.fetch_add(1, Ordering::SeqCst);
        Ok(self.scan_completes.load(Ordering::SeqCst))
    }
}

#[derive(Debug)]
pub struct FakeGate {
    pub state: Mutex<PermissionState>,
    pub prompt_fails: AtomicBool,
    pub prompts: AtomicUsize,
    pub pending: Mutex<Vec<oneshot::Sender<PermissionState>>>,
}

impl FakeGate {
    pub fn new(state: PermissionState) -> Self {
        Self {
            state: Mutex::new(state),
            prompt_fails: AtomicBool::new(false),
            prompts: AtomicUsize::new(0),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn granted() -> Self {
        Self::new(PermissionState::Granted)
    }

    pub fn denied() -> Self {
        Self::new(PermissionState::Denied)
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    /// Simulate the user answering every open prompt
    pub fn answer(&self, decision: PermissionState) {
        *self.state.lock().unwrap() = decision;
        for tx in self.pending.lock().unwrap().drain(..) {
            let _ = tx.send(decision);
        }
    }
}

impl PermissionGate for FakeGate {
    fn check(&self) -> PermissionState {
        *self.state.lock().unwrap()
    }

    fn prompt(&self) -> WifiResult<PermissionOutcome> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        if self.prompt_fails.load(Ordering::SeqCst) {
            return Err(WifiError::PromptUnavailable("no prompt in tests".into()));
        }
        let (tx, outcome) = PermissionOutcome::channel();
        self.pending.lock().unwrap().push(tx);
        Ok(outcome)
    }
}
