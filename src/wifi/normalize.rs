use crate::wifi::types::{AccessPoint, ScanResult};
use std::collections::BTreeSet;

/// Reduce raw access point records to a sorted list of unique, non-empty SSIDs
pub fn normalize<I>(records: I) -> ScanResult
where
    I: IntoIterator<Item = AccessPoint>,
{
    let names: BTreeSet<String> = records
        .into_iter()
        .filter_map(|ap| ap.ssid)
        .filter(|ssid| !ssid.is_empty())
        .collect();

    ScanResult::from_sorted(names)
}
